use crate::config::{AuthMethod, TargetConfig, Variant};
use std::fmt::Write;

/// ODBC connection string for one probe, plus a copy safe to log
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    value: String,
    redacted: String,
}

impl ConnectionString {
    #[must_use]
    pub fn build(target: &TargetConfig, auth: AuthMethod, variant: &Variant) -> Self {
        let server = match variant {
            Variant::NoPort => target.host.clone(),
            Variant::Instance(instance) => format!("{}\\{instance}", target.host),
            Variant::Standard | Variant::SystemDatabase => {
                format!("{},{}", target.host, target.port)
            }
        };
        let database = match variant {
            Variant::SystemDatabase => TargetConfig::SYSTEM_DATABASE,
            _ => target.database.as_str(),
        };

        let mut head = String::new();
        // driver names are always braced, they routinely contain spaces
        let _ = write!(head, "DRIVER={{{}}};", target.driver.replace('}', "}}"));
        push_attribute(&mut head, "SERVER", &server);
        push_attribute(&mut head, "DATABASE", database);

        match auth {
            AuthMethod::SqlLogin => {
                push_attribute(&mut head, "UID", &target.username);
                let mut value = head.clone();
                let mut redacted = head;
                push_attribute(&mut value, "PWD", &target.password);
                push_attribute(&mut redacted, "PWD", "***");
                Self { value, redacted }
            }
            AuthMethod::Trusted => {
                push_attribute(&mut head, "Trusted_Connection", "yes");
                Self {
                    value: head.clone(),
                    redacted: head,
                }
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted)
    }
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    let _ = write!(out, "{key}={};", escape(value));
}

/// Values holding `;`, `{`, `}` or outer spaces are wrapped in braces with `}` doubled
fn escape(value: &str) -> String {
    let needs_braces = value.contains([';', '{', '}'])
        || value.starts_with(' ')
        || value.ends_with(' ');
    if needs_braces {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}
