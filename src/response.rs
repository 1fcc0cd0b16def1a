use serde::Serialize;

/// `{"status": "success", "message"?: .., "data"?: ..}` body.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::message("pong!")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "pong!"}));
    }

    #[test]
    fn data_envelope_omits_message() {
        let json = serde_json::to_value(Envelope::data(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": [1, 2]}));
    }
}
