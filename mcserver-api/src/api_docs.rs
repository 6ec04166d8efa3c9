use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::server;
use crate::response::{ErrorResponse, MessageResponse, StatusResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        server::server_status,
        server::start_server,
        server::stop_server
    ),
    components(schemas(StatusResponse, MessageResponse, ErrorResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "mcserver-api", description = "Minecraft server instance control")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
