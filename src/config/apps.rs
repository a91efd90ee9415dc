//! Vhost definitions from config into registrations.
//!
//! # App values
//! ```text
//! "name"                               → AppCatalog entry
//! [app, [app, app]]                    → HandlerSource::List
//! { body = "..", status = 200,
//!   headers = { .. } }                 → StaticResponse (terminal)
//! { set_headers = { .. } }             → SetHeaders (middleware)
//! anything else                        → InvalidAppType / InvalidAppTable
//! ```

use std::collections::{BTreeMap, HashMap};

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Deserialize;

use crate::config::schema::{SwitchConfig, VhostConfig};
use crate::error::VhostError;
use crate::handler::HandlerSource;
use crate::http::response::{SetHeaders, StaticResponse};
use crate::routing::{SwitchOptions, Vhost, VhostSwitch};

/// Named apps the config can refer to by string.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    apps: HashMap<String, HandlerSource>,
}

impl AppCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an app under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, app: impl Into<HandlerSource>) -> &mut Self {
        self.apps.insert(name.into(), app.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, app: impl Into<HandlerSource>) -> Self {
        self.insert(name, app);
        self
    }

    pub fn get(&self, name: &str) -> Option<&HandlerSource> {
        self.apps.get(name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AppTable {
    body: Option<String>,
    status: Option<u16>,
    headers: BTreeMap<String, String>,
    set_headers: BTreeMap<String, String>,
}

/// Build the switch described by `config`.
pub fn build_switch(config: &SwitchConfig, catalog: &AppCatalog) -> Result<VhostSwitch, VhostError> {
    let vhosts = config
        .vhosts
        .iter()
        .map(|vhost| vhost_from_config(vhost, catalog))
        .collect::<Result<Vec<_>, _>>()?;

    VhostSwitch::new(SwitchOptions {
        trim_www: config.trim_www,
        trust_proxy: config.trust_proxy,
        vhosts,
    })
}

/// Turn one config entry into a registration.
pub fn vhost_from_config(vhost: &VhostConfig, catalog: &AppCatalog) -> Result<Vhost, VhostError> {
    let host = match &vhost.host {
        Some(toml::Value::String(host)) => host.clone(),
        Some(other) => {
            return Err(VhostError::InvalidHost {
                host: other.to_string(),
            })
        }
        None => {
            return Err(VhostError::InvalidHost {
                host: "<missing>".to_string(),
            })
        }
    };

    let app = match &vhost.app {
        Some(app) => app_source(app, catalog)?,
        None => {
            return Err(VhostError::InvalidAppType {
                found: "nothing".to_string(),
            })
        }
    };

    Ok(Vhost { host, app })
}

/// Turn a TOML app value into a handler source.
pub fn app_source(value: &toml::Value, catalog: &AppCatalog) -> Result<HandlerSource, VhostError> {
    match value {
        toml::Value::String(name) => catalog
            .get(name)
            .cloned()
            .ok_or_else(|| VhostError::UnknownApp(name.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| app_source(item, catalog))
            .collect::<Result<Vec<_>, _>>()
            .map(HandlerSource::List),
        toml::Value::Table(table) => {
            let table: AppTable = toml::Value::Table(table.clone())
                .try_into()
                .map_err(|e: toml::de::Error| VhostError::InvalidAppTable(e.message().to_string()))?;
            table_source(table)
        }
        other => Err(VhostError::InvalidAppType {
            found: other.type_str().to_string(),
        }),
    }
}

fn table_source(table: AppTable) -> Result<HandlerSource, VhostError> {
    let responds = table.body.is_some() || table.status.is_some();

    if responds {
        if !table.set_headers.is_empty() {
            return Err(VhostError::InvalidAppTable(
                "`set_headers` cannot be combined with `body` or `status`; use `headers`".to_string(),
            ));
        }
        let status = match table.status {
            Some(code) => StatusCode::from_u16(code)
                .map_err(|_| VhostError::InvalidAppTable(format!("invalid status {code}")))?,
            None => StatusCode::OK,
        };
        let headers = header_map(&table.headers)?;
        let body = table.body.unwrap_or_default();
        return Ok(StaticResponse::new(status, headers, body).into_handler_fn().into());
    }

    if !table.set_headers.is_empty() {
        if !table.headers.is_empty() {
            return Err(VhostError::InvalidAppTable(
                "`headers` needs a `body` or `status`".to_string(),
            ));
        }
        let headers = header_map(&table.set_headers)?;
        return Ok(SetHeaders::new(headers).into_handler_fn().into());
    }

    Err(VhostError::InvalidAppTable(
        "expected `body`, `status` or `set_headers`".to_string(),
    ))
}

fn header_map(pairs: &BTreeMap<String, String>) -> Result<HeaderMap, VhostError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| VhostError::InvalidAppTable(format!("invalid header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| VhostError::InvalidAppTable(format!("invalid value for header {name}")))?;
        if headers.contains_key(&name) {
            return Err(VhostError::InvalidAppTable(format!("header {name} given twice")));
        }
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::handler::{handler_fn, Next};
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::response::{IntoResponse, Response};

    async fn named(_req: Request<Body>) -> &'static str {
        "named"
    }

    fn vhost(host: toml::Value, app: toml::Value) -> VhostConfig {
        VhostConfig {
            host: Some(host),
            app: Some(app),
        }
    }

    fn body_app(body: &str) -> toml::Value {
        let mut table = toml::Table::new();
        table.insert("body".into(), toml::Value::String(body.into()));
        toml::Value::Table(table)
    }

    async fn get(switch: &VhostSwitch, host: &str) -> Response {
        let req = Request::builder()
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap();
        let next = Next::new(|_req| async {
            (StatusCode::NOT_FOUND, "nothing matched").into_response()
        });
        switch.handle(req, next).await
    }

    async fn text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_build_switch_from_toml() {
        let config = parse_config(
            r#"
            [[vhosts]]
            host = "localhost"
            app = { body = "Hello", headers = { "X-Powered-By" = "hello" } }

            [[vhosts]]
            host = "127.0.0.1"
            app = [[{ set_headers = { server = "vhost-switch" } }], { status = 202, body = "World" }]

            [[vhosts]]
            host = "named.example"
            app = "named"
            "#,
        )
        .unwrap();
        let catalog = AppCatalog::new().with("named", handler_fn(named));
        let switch = build_switch(&config, &catalog).unwrap();
        assert_eq!(switch.len(), 3);

        let res = get(&switch, "LOCALHOST").await;
        assert_eq!(res.headers()["x-powered-by"], "hello");
        assert_eq!(text(res).await, "Hello");

        let res = get(&switch, "127.0.0.1").await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()["server"], "vhost-switch");
        assert_eq!(text(res).await, "World");

        assert_eq!(text(get(&switch, "www.named.example").await).await, "named");
        assert_eq!(text(get(&switch, "other").await).await, "nothing matched");
    }

    #[test]
    fn test_non_string_hosts() {
        let catalog = AppCatalog::new();
        let hosts = [
            toml::Value::Integer(1),
            toml::Value::Float(1.0),
            toml::Value::Boolean(true),
            toml::Value::Array(Vec::new()),
            toml::Value::Table(toml::Table::new()),
        ];
        for host in hosts {
            let result = vhost_from_config(&vhost(host, body_app("x")), &catalog);
            assert!(matches!(result, Err(VhostError::InvalidHost { .. })));
        }

        let missing = VhostConfig {
            host: None,
            app: Some(body_app("x")),
        };
        assert!(matches!(
            vhost_from_config(&missing, &catalog),
            Err(VhostError::InvalidHost { .. })
        ));
    }

    #[test]
    fn test_invalid_app_types() {
        let catalog = AppCatalog::new();
        for (value, type_name) in [
            (toml::Value::Integer(7), "integer"),
            (toml::Value::Boolean(false), "boolean"),
            (toml::Value::Float(0.5), "float"),
        ] {
            match app_source(&value, &catalog) {
                Err(VhostError::InvalidAppType { found }) => assert_eq!(found, type_name),
                other => panic!("expected InvalidAppType, got {other:?}"),
            }
        }

        // nested inside a list
        let list = toml::Value::Array(vec![body_app("x"), toml::Value::Integer(7)]);
        assert!(matches!(
            app_source(&list, &catalog),
            Err(VhostError::InvalidAppType { .. })
        ));
    }

    #[test]
    fn test_unknown_app_name() {
        let result = app_source(&toml::Value::String("missing".into()), &AppCatalog::new());
        assert!(matches!(result, Err(VhostError::UnknownApp(name)) if name == "missing"));
    }

    #[test]
    fn test_invalid_tables() {
        let catalog = AppCatalog::new();
        let cases = [
            "{}",
            "{ unknown = 1 }",
            "{ status = 42 }",
            "{ body = \"x\", headers = { \"bad header\" = \"v\" } }",
            "{ body = \"x\", set_headers = { a = \"b\" } }",
            "{ headers = { a = \"b\" }, set_headers = { c = \"d\" } }",
        ];
        for case in cases {
            let value: toml::Table = toml::from_str(&format!("app = {case}")).unwrap();
            let result = app_source(&value["app"], &catalog);
            assert!(
                matches!(result, Err(VhostError::InvalidAppTable(_))),
                "{case} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_header_names_differing_in_case() {
        let pairs = BTreeMap::from([
            ("X-A".to_string(), "1".to_string()),
            ("x-a".to_string(), "2".to_string()),
        ]);
        match header_map(&pairs) {
            Err(VhostError::InvalidAppTable(message)) => assert!(message.contains("x-a")),
            other => panic!("expected InvalidAppTable, got {other:?}"),
        }

        let value: toml::Table =
            toml::from_str(r#"app = { body = "x", headers = { "X-A" = "1", "x-a" = "2" } }"#)
                .unwrap();
        assert!(matches!(
            app_source(&value["app"], &AppCatalog::new()),
            Err(VhostError::InvalidAppTable(_))
        ));
    }

    #[test]
    fn test_duplicate_hosts_in_config() {
        let config = parse_config(
            r#"
            [[vhosts]]
            host = "example.com"
            app = { body = "a" }

            [[vhosts]]
            host = "WWW.example.com"
            app = { body = "b" }
            "#,
        )
        .unwrap();
        let result = build_switch(&config, &AppCatalog::new());
        assert!(matches!(result, Err(VhostError::DuplicateHost(key)) if key.as_str() == "example.com"));
    }
}
