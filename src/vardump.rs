use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Format a variable name and value for info/debug messages.
///
/// Scalars and sequences render inline as `name (type): value`; maps and
/// structs render as a multi-line pretty-printed block with 4-space indent,
/// keys in insertion order.
pub fn var_value<T: Serialize>(name: &str, value: &T) -> String {
    let type_name = std::any::type_name::<T>();
    match serde_json::to_value(value) {
        Ok(value @ Value::Object(_)) => {
            format!("{} ({}):\n{}", name, type_name, pretty_block(&value))
        }
        Ok(value) => format!("{} ({}): {}", name, type_name, inline(&value)),
        Err(_) => format!("{} ({}): <unserializable>", name, type_name),
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty_block(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_render_inline() {
        let rendered = var_value("x", &5);
        assert!(rendered.contains("x ("));
        assert!(rendered.ends_with(": 5"));
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn strings_render_inline_unquoted() {
        let rendered = var_value("greeting", &"hello");
        assert!(rendered.ends_with(": hello"));
    }

    #[test]
    fn none_renders_as_none() {
        let rendered = var_value("maybe", &Option::<u32>::None);
        assert!(rendered.ends_with(": none"));
    }

    #[test]
    fn sequences_render_inline_compact() {
        let rendered = var_value("ports", &[80, 443, 8080]);
        assert!(rendered.ends_with(": [80,443,8080]"));
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn composite_values_render_as_block() {
        #[derive(Serialize)]
        struct Endpoint {
            host: String,
            port: u16,
        }
        let rendered = var_value(
            "endpoint",
            &Endpoint {
                host: "localhost".to_string(),
                port: 9090,
            },
        );
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("    \"host\": \"localhost\""));
        assert!(rendered.contains("    \"port\": 9090"));
    }

    #[test]
    fn map_keys_keep_insertion_order() {
        let rendered = var_value("config", &json!({"zebra": 1, "apple": 2}));
        let zebra_at = rendered.find("zebra").unwrap();
        let apple_at = rendered.find("apple").unwrap();
        assert!(zebra_at < apple_at);
    }
}
