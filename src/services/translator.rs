use crate::constants::backend::{API_KEY_HEADER, JSON_CONTENT_TYPE, PREFER_REPRESENTATION};
use crate::models::{CreateReservation, DeleteReservation, LookupReservation, UpdateReservation};
use crate::services::config::BackendSettings;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// A fully formed backend call, independent of any HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RestRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }

    /// `column=eq.value` pairs in the query string, still percent-encoded.
    pub fn filters(&self) -> Vec<&str> {
        self.query()
            .map(|q| q.split('&').filter(|pair| pair.contains("=eq.")).collect())
            .unwrap_or_default()
    }
}

/// Maps validated reservation inputs onto PostgREST calls.
#[derive(Clone)]
pub struct RequestTranslator {
    settings: Arc<BackendSettings>,
}

impl RequestTranslator {
    pub fn new(settings: Arc<BackendSettings>) -> Self {
        Self { settings }
    }

    pub fn create(&self, input: &CreateReservation) -> RestRequest {
        let body = serde_json::json!([input]);
        self.build(Method::POST, Vec::new(), Some(body), true)
    }

    pub fn update(&self, input: &UpdateReservation) -> RestRequest {
        let body = Value::Object(input.changes.to_patch());
        self.build(
            Method::PATCH,
            locate(&input.mobile, &input.name),
            Some(body),
            true,
        )
    }

    pub fn delete(&self, input: &DeleteReservation) -> RestRequest {
        self.build(
            Method::DELETE,
            locate(&input.mobile, &input.name),
            None,
            true,
        )
    }

    pub fn lookup(&self, input: &LookupReservation) -> RestRequest {
        let mut query = vec!["select=*".to_string()];
        query.extend(locate(&input.mobile, &input.name));
        if let Some(date) = &input.date {
            query.push(eq("date", date));
        }
        if let Some(time) = &input.time {
            query.push(eq("time", time));
        }
        self.build(Method::GET, query, None, false)
    }

    fn build(
        &self,
        method: Method,
        query: Vec<String>,
        body: Option<Value>,
        return_rows: bool,
    ) -> RestRequest {
        let key = self.settings.api_key();
        let mut headers = vec![
            (API_KEY_HEADER.to_string(), key.to_string()),
            ("Authorization".to_string(), format!("Bearer {}", key)),
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        if return_rows {
            headers.push(("Prefer".to_string(), PREFER_REPRESENTATION.to_string()));
        }

        let mut url = self.settings.reservations_url();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        RestRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

fn eq(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, urlencoding::encode(value))
}

fn locate(mobile: &str, name: &str) -> Vec<String> {
    vec![eq("mobile", mobile), eq("name", name)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReservationChanges;

    fn translator() -> RequestTranslator {
        let settings =
            BackendSettings::new(Some("https://db.example.com"), Some("anon-key")).unwrap();
        RequestTranslator::new(Arc::new(settings))
    }

    fn ada_create() -> CreateReservation {
        CreateReservation {
            mobile: "+1234567890".to_string(),
            name: "Ada Lovelace".to_string(),
            nb_people: 4,
            date: "2025-05-01".to_string(),
            time: "19:00".to_string(),
            email: None,
            notes: Some("window seat".to_string()),
        }
    }

    #[test]
    fn create_posts_single_element_array_without_filters() {
        let request = translator().create(&ada_create());
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://db.example.com/rest/v1/reservations");
        assert_eq!(request.query(), None);
        let body = request.body.as_ref().and_then(|b| b.as_array()).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["nb_people"], 4);
        assert_eq!(body[0]["notes"], "window seat");
        assert!(body[0].get("email").is_none());
        assert_eq!(request.header("Prefer"), Some("return=representation"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn every_request_carries_both_credentials() {
        let request = translator().delete(&DeleteReservation {
            mobile: "1".to_string(),
            name: "A".to_string(),
        });
        assert_eq!(request.header("apikey"), Some("anon-key"));
        assert_eq!(request.header("Authorization"), Some("Bearer anon-key"));
        assert_eq!(request.header("Content-Type"), None);
        assert_eq!(request.body, None);
    }

    #[test]
    fn update_filters_on_current_pair_and_remaps_rekey() {
        let request = translator().update(&UpdateReservation {
            mobile: "+1234567890".to_string(),
            name: "Ada Lovelace".to_string(),
            changes: ReservationChanges {
                new_name: Some("Ada King".to_string()),
                time: Some("20:30".to_string()),
                ..Default::default()
            },
        });
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(
            request.filters(),
            vec!["mobile=eq.%2B1234567890", "name=eq.Ada%20Lovelace"]
        );
        assert_eq!(
            request.body,
            Some(serde_json::json!({"name": "Ada King", "time": "20:30"}))
        );
    }

    #[test]
    fn lookup_selects_all_columns_with_optional_qualifiers() {
        let t = translator();
        let mut input = LookupReservation {
            mobile: "+1234567890".to_string(),
            name: "Ada Lovelace".to_string(),
            date: None,
            time: None,
        };
        let request = t.lookup(&input);
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.query(),
            Some("select=*&mobile=eq.%2B1234567890&name=eq.Ada%20Lovelace")
        );
        assert_eq!(request.header("Prefer"), None);

        input.date = Some("2025-05-01".to_string());
        input.time = Some("19:00".to_string());
        assert_eq!(
            t.lookup(&input).filters(),
            vec![
                "mobile=eq.%2B1234567890",
                "name=eq.Ada%20Lovelace",
                "date=eq.2025-05-01",
                "time=eq.19%3A00"
            ]
        );
    }

    #[test]
    fn filter_values_cannot_inject_extra_predicates() {
        let request = translator().delete(&DeleteReservation {
            mobile: "1&name=eq.x".to_string(),
            name: "O'Brien & Co".to_string(),
        });
        assert_eq!(request.filters().len(), 2);
        assert_eq!(request.query().unwrap().split('&').count(), 2);
    }
}
