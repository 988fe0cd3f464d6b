use notification_relay::config::Config;
use serde_json::{Value, json};
use tokio_test::assert_ok;

pub const CREATE_END: &str = "compute.instance.create.end";

pub fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = [
        ("RABBITMQ_USERNAME", "relay"),
        ("RABBITMQ_PASSWORD", "relay"),
        ("RABBITMQ_HOSTS", "localhost:5672"),
        ("QUEUE_NAME", "openstack-notifications"),
        ("TOPIC", "notifications.info"),
        ("EXCHANGES", "nova"),
        ("WEBHOOK_URL", "http://localhost:8080/hook"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in pairs {
        vars.retain(|(k, _)| k != key);
        vars.push((key.to_string(), value.to_string()));
    }

    vars
}

pub fn config(pairs: &[(&str, &str)]) -> Config {
    assert_ok!(Config::from_vars(vars(pairs)))
}

/// Nova notification with the envelope as a nested object.
pub fn instance_created() -> Value {
    json!({
        "oslo.message": {
            "event_type": CREATE_END,
            "_context_project_name": "demo",
            "_context_user_name": "admin",
            "payload": {
                "display_name": "vm1",
                "state": "active",
                "state_description": ""
            }
        }
    })
}

/// Same event as it usually arrives: the envelope JSON-encoded inside a string.
pub fn instance_created_encoded() -> Value {
    let envelope = instance_created()["oslo.message"].to_string();

    json!({
        "oslo.version": "2.0",
        "oslo.message": envelope
    })
}
