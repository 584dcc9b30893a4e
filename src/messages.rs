use serde::Deserialize;

/// User-facing strings of the contact form.
///
/// Templates may reference `{label}` and `{min}`; unknown placeholders are
/// left in place.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct MessageCatalog {
    pub field_required: String,
    pub email_required: String,
    pub email_invalid: String,
    pub message_required: String,
    pub message_too_short: String,
    pub min_message_chars: usize,
    pub form_invalid: String,
    pub submit_success: String,
    pub submit_failure: String,
    pub submit_idle_label: String,
    pub submit_busy_label: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            field_required: "{label} is required".to_string(),
            email_required: "Email is required".to_string(),
            email_invalid: "Please enter a valid email address".to_string(),
            message_required: "Message is required".to_string(),
            message_too_short: "Message must be at least {min} characters".to_string(),
            min_message_chars: 10,
            form_invalid: "Please fix the errors above.".to_string(),
            submit_success: "Thank you! Your message has been sent successfully.".to_string(),
            submit_failure:
                "Sorry, there was an error sending your message. Please try again.".to_string(),
            submit_idle_label: "Send Message".to_string(),
            submit_busy_label: "Sending...".to_string(),
        }
    }
}

impl MessageCatalog {
    pub fn field_required(&self, label: &str) -> String {
        format_template(&self.field_required, &[("label", label)])
    }

    pub fn message_too_short(&self) -> String {
        let min = self.min_message_chars.to_string();
        format_template(&self.message_too_short, &[("min", &min)])
    }

    pub fn submit_label(&self, busy: bool) -> &str {
        if busy {
            &self.submit_busy_label
        } else {
            &self.submit_idle_label
        }
    }
}

/// Replaces `{name}` with its value from `params`. Unknown names and an
/// unclosed brace are copied through.
pub fn format_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };
        let name = &after[..close];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[open..=open + close + 1]),
        }
        rest = &after[close + 1..];
    }
    output.push_str(rest);
    output
}
