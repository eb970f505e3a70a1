use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the account registration POST. Values are carried exactly as typed.
#[derive(Clone, Debug)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl Serialize for SignupRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("SignupRequest", 3)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("email", &self.email)?;
        s.serialize_field("password", self.password.expose_secret())?;
        s.end()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl SignupErrorBody {
    pub fn detail(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: SecretString::new(password.to_string()),
        }
    }

    #[test]
    fn request_serializes_exactly_three_fields() {
        let value = serde_json::to_value(request("  Ana ", "ana@example.com", "s3nh@"))
            .expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "name": "  Ana ",
                "email": "ana@example.com",
                "password": "s3nh@",
            })
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", request("ana", "ana@example.com", "hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn error_detail_handles_string_null_missing_and_structured_values() {
        let body: SignupErrorBody =
            serde_json::from_str(r#"{"error":"Email already exists"}"#).expect("body");
        assert_eq!(body.detail().as_deref(), Some("Email already exists"));

        let body: SignupErrorBody = serde_json::from_str(r#"{"error":null}"#).expect("body");
        assert_eq!(body.detail(), None);

        let body: SignupErrorBody = serde_json::from_str(r#"{"message":"nope"}"#).expect("body");
        assert_eq!(body.detail(), None);

        let body: SignupErrorBody =
            serde_json::from_str(r#"{"error":{"code":409}}"#).expect("body");
        assert_eq!(body.detail().as_deref(), Some(r#"{"code":409}"#));
    }
}
