use serde::Deserialize;

/// Raw contact form fields. Missing fields deserialize as empty strings so
/// they fail validation rather than extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields(Vec<&'static str>),
}

/// The notification sent to the site owner for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEmail {
    pub subject: String,
    pub body: String,
    /// Submitter address, used as Reply-To when it parses.
    pub reply_to: String,
}

impl ContactSubmission {
    pub fn validate(&self) -> Result<ContactEmail, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        let missing: Vec<&'static str> = [("name", name), ("email", email), ("message", message)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(ContactEmail {
            subject: format!("New Contact Form Submission from {}", name),
            body: format!("Name: {}\nEmail: {}\nMessage: {}\n", name, email, message),
            reply_to: email.to_string(),
        })
    }
}
