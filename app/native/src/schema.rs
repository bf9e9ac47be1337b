use crate::config::BackdropConfig;

/// Published location of the configuration schema.
pub const SCHEMA_ID: &str = "https://raw.githubusercontent.com/backdrop-rs/backdrop/main/backdrop.schema.json";

/// Generates a JSON Schema for the Backdrop configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(BackdropConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Generates the schema as pretty-printed JSON.
#[must_use]
pub fn generate_schema_json() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed() -> serde_json::Value { serde_json::from_str(&generate_schema_json()).unwrap() }

    #[test]
    fn test_schema_is_identified() {
        let schema = parsed();
        assert_eq!(schema["$id"], SCHEMA_ID);
        assert_eq!(schema["$schema"], "https://json-schema.org/draft/2020-12/schema");
        assert_eq!(schema["title"], "BackdropConfig");
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = parsed();
        assert!(schema["properties"]["slideshow"].is_object());
        assert!(schema["properties"]["performance"].is_object());
    }

    #[test]
    fn test_schema_uses_config_field_names() {
        let json = generate_schema_json();
        assert!(json.contains("pauseOnHighCpu"));
        assert!(json.contains("excludedApps"));
        assert!(json.contains("single-repeat"));
        assert!(json.contains("power-save"));
    }
}
