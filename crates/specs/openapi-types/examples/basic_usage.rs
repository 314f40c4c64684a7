//! Basic usage example for openapi-types
//!
//! Builds a small document in code, resolves a reference through the
//! workspace, validates it, then reads a Swagger 2.0 document from text.
//! Pass a path to read that file instead.

use openapi_types::{
    Components, Info, License, MediaType, OpenApiDocument, OpenApiReader, Operation, OperationType,
    PathItem, Paths, Reference, Response, Responses, Schema, SchemaOrReference, Validate,
    ValidationRuleSet,
};

const SWAGGER: &str = r#"
swagger: "2.0"
info:
  title: Users
  version: 1.0.0
host: api.example.com
basePath: /v2
schemes: [https]
paths:
  /users:
    post:
      parameters:
        - name: user
          in: body
          required: true
          schema:
            $ref: '#/definitions/User'
      responses:
        201:
          description: Created
definitions:
  User:
    type: object
    properties:
      id:
        type: string
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // A user schema component and an operation returning it by reference
    let user = Schema::object()
        .with_title("User")
        .with_property("id", Schema::string().with_format("uuid"))
        .with_property("name", Schema::string())
        .with_required("id");
    let user_ref = SchemaOrReference::from_reference(Reference::schema("User")?);

    let get_user = Operation::default()
        .with_operation_id("getUser")
        .with_responses(Responses::new().with(
            "200",
            Response::new("The user")
                .with_content("application/json", MediaType::with_schema(user_ref.clone())),
        ));

    let document = OpenApiDocument::new(
        Info::new("Example API", "1.0.0")
            .with_description("A simple example API")
            .with_license(License::new("MIT")),
    )
    .with_paths(Paths::new().with(
        "/users/{id}",
        PathItem::default().with_operation(OperationType::Get, get_user),
    ))
    .with_components(Components::new().with_schema("User", user))
    .into_shared();

    // The reference now resolves through the document's workspace
    println!("User reference resolves to {:?}", user_ref.title());
    println!("Serialized:\n{}", serde_json::to_string_pretty(&*document)?);

    let diagnostics = document.validate(&ValidationRuleSet::default_rule_set());
    for diagnostic in &diagnostics {
        println!("{diagnostic}");
    }

    // Read a document from text
    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SWAGGER.to_string(),
    };
    let read = OpenApiReader::default().read_str(&input)?;
    println!(
        "Read {} document '{}' with {} errors and {} warnings",
        read.document
            .spec_version
            .map(|version| version.to_string())
            .unwrap_or_default(),
        read.document.info.title.as_deref().unwrap_or_default(),
        read.diagnostic.errors.len(),
        read.diagnostic.warnings.len()
    );
    for server in &read.document.servers {
        println!("Server: {}", server.url.as_deref().unwrap_or_default());
    }

    Ok(())
}
