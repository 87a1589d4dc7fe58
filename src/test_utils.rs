use crate::schema::{export_schema_to_registry, read_tf_schema_from_file, SchemaRegistry};
use serde_json::{Map, Value};

pub const POWERSCALE_SCHEMA: &str = "./tests/fixtures/powerscale-provider-schema.json";
pub const SMB_SHARE_CONFIG: &str = include_str!("../tests/fixtures/smb_share_config.json");
pub const SMB_SHARE_STATE: &str = include_str!("../tests/fixtures/smb_share_state.json");

/// Registry built from the PowerScale schema fixture.
pub fn powerscale_registry() -> SchemaRegistry {
    let schema = read_tf_schema_from_file(POWERSCALE_SCHEMA).unwrap();
    export_schema_to_registry(&schema).unwrap()
}

/// Parses a JSON object, panicking on anything else.
pub fn document(json: &str) -> Map<String, Value> {
    match serde_json::from_str(json).unwrap() {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
