//! Common test utilities for sunset-directory-entra integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use sunset_directory_entra::{EntraConfig, EntraCredentials, EntraDirectory};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_ID: &str = "contoso";

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Creates a new mock Graph API server with a working token endpoint.
    pub async fn new() -> Self {
        let mock = Self {
            server: MockServer::start().await,
        };
        mock.mock_token_endpoint().await;
        mock
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Builds a directory client pointed at this server.
    pub fn directory(&self) -> EntraDirectory {
        let config = EntraConfig::builder()
            .tenant_id(TENANT_ID)
            .graph_endpoint(self.url())
            .login_endpoint(self.url())
            .build()
            .unwrap();
        let credentials = EntraCredentials {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string().into(),
        };
        EntraDirectory::new(config, credentials).unwrap()
    }

    async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/{TENANT_ID}/oauth2/v2.0/token")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response("mock-access-token", 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Sets up the user lookup endpoint. The UPN arrives percent-encoded.
    pub async fn mock_user(&self, upn: &str, object_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/users/{}", urlencoding::encode(upn))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": object_id })))
            .mount(&self.server)
            .await;
    }

    /// Sets up the filtered direct-member lookup of `object_id` in `group_id`.
    pub async fn mock_direct_member(&self, group_id: &str, object_id: &str, direct: bool) {
        let value = if direct {
            json!([{ "@odata.type": "#microsoft.graph.user", "id": object_id }])
        } else {
            json!([])
        };
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/groups/{group_id}/members")))
            .and(query_param("$filter", format!("id eq '{object_id}'")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "@odata.count": value.as_array().map_or(0, Vec::len),
                "value": value
            })))
            .mount(&self.server)
            .await;
    }

    /// Responds to any request on `path_str` with `status` and an OData error.
    pub async fn mock_error(&self, http_method: &str, path_str: &str, status: u16, code: &str) {
        Mock::given(method(http_method))
            .and(path(path_str))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(create_odata_error(code, "mock error")),
            )
            .mount(&self.server)
            .await;
    }
}
