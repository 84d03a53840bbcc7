use std::collections::BTreeMap;

/// Key/value label attached to a message for provider-side tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// A fully rendered email ready for a [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub reply_to: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub tags: Vec<Tag>,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            html: html.into(),
            text: text.into(),
            reply_to: None,
            headers: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Mark the message high priority for clients that honour the legacy headers.
    pub fn high_priority(self) -> Self {
        self.with_header("X-Priority", "1")
            .with_header("X-MSMail-Priority", "High")
            .with_header("Importance", "high")
    }
}

/// Strip a display name: `Team <team@x.com>` becomes `team@x.com`.
pub fn bare_address(address: &str) -> &str {
    match (address.find('<'), address.rfind('>')) {
        (Some(start), Some(end)) if start < end => address[start + 1..end].trim(),
        _ => address.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_strips_display_name() {
        assert_eq!(bare_address("Hyperkit <team@x.com>"), "team@x.com");
        assert_eq!(bare_address(" team@x.com "), "team@x.com");
        assert_eq!(bare_address("broken > <"), "broken > <");
    }

    #[test]
    fn builder_collects_metadata() {
        let msg = EmailMessage::new("to@x.com", "from@x.com", "Hi", "<p>Hi</p>", "Hi")
            .high_priority()
            .with_tag("category", "waitlist-confirmation");
        assert_eq!(msg.headers.get("X-Priority").map(String::as_str), Some("1"));
        assert_eq!(msg.tags.len(), 1);
        assert!(msg.reply_to.is_none());
    }
}
