use openapi_types::{
    JsonSchemaType, OpenApiError, OpenApiReader, OpenApiSpecVersion, OperationType,
    ParameterLocation, ReaderSettings, ReferenceType, Validate, ValidationRuleSet,
};
use serde_json::json;

const PETSTORE_V3: &str = include_str!("fixtures/petstore-3.0.yaml");
const PETSTORE_V2: &str = include_str!("fixtures/petstore-2.0.json");

#[test]
fn test_read_yaml_document() {
    let read = OpenApiReader::default()
        .read_str(PETSTORE_V3)
        .expect("petstore should read");
    assert!(!read.diagnostic.has_errors(), "{:?}", read.diagnostic.errors);
    assert_eq!(read.diagnostic.spec_version, Some(OpenApiSpecVersion::V3_0));

    let document = read.document;
    assert_eq!(document.openapi.as_deref(), Some("3.0.3"));
    assert_eq!(document.info.title.as_deref(), Some("Petstore"));
    assert_eq!(
        document.servers[0].interpolated_url().as_deref(),
        Some("https://eu.petstore.example.com/v1")
    );
    assert_eq!(document.tags[0].extensions.get("x-display-name"), Some(&json!("Pets")));

    let paths = document.paths.as_ref().unwrap();
    assert_eq!(paths.len(), 2);
    let pets = paths.get("/pets").unwrap().as_inline().unwrap();
    let list = &pets.operations[&OperationType::Get];
    assert_eq!(list.operation_id.as_deref(), Some("listPets"));

    // Resolved through the workspace: the coerced example, the forwarded name
    let limit = &list.parameters[0];
    assert!(limit.is_reference());
    assert_eq!(limit.name().as_deref(), Some("limit"));
    assert_eq!(limit.location(), Some(ParameterLocation::Query));
    assert_eq!(limit.target().unwrap().example, Some(json!(20)));

    let pet = paths.get("/pets/{petId}").unwrap().as_inline().unwrap();
    assert!(pet.parameters[0].required());
}

#[test]
fn test_unknown_fields_are_retained() {
    let input = json!({
        "openapi": "3.0.0",
        "info": {"title": "t", "version": "1", "summary": "only in 3.1"},
        "paths": {},
        "x-generator": "hand"
    });
    let read = OpenApiReader::default().read_value(&input).unwrap();

    assert_eq!(
        read.document.info.unrecognized_fields.get("summary"),
        Some(&json!("only in 3.1"))
    );
    assert_eq!(read.document.info.summary, None);
    assert_eq!(read.document.extensions.get("x-generator"), Some(&json!("hand")));
    assert_eq!(read.diagnostic.warnings.len(), 1);
    assert_eq!(read.diagnostic.warnings[0].pointer, "#/info/summary");
    assert!(!read.diagnostic.has_errors());
}

#[test]
fn test_lenient_and_strict_reading() {
    let input = json!({
        "openapi": "3.0.0",
        "info": {"title": "t", "version": "1"},
        "paths": {"/pets": {"get": {"parameters": [{"name": "id", "in": "body"}]}}}
    });

    let read = OpenApiReader::default().read_value(&input).unwrap();
    assert_eq!(read.diagnostic.errors.len(), 1);
    assert_eq!(
        read.diagnostic.errors[0].pointer,
        "#/paths/~1pets/get/parameters/0/in"
    );

    let strict = OpenApiReader::new(ReaderSettings::builder().strict(true).build());
    let err = strict.read_value(&input).unwrap_err();
    assert!(matches!(err, OpenApiError::Structural { .. }));
    assert_eq!(err.pointer(), Some("#/paths/~1pets/get/parameters/0/in"));
}

#[test]
fn test_missing_required_fields_are_reported() {
    let read = OpenApiReader::default()
        .read_str(r#"{"openapi": "3.0.1"}"#)
        .unwrap();
    let pointers: Vec<_> = read
        .diagnostic
        .errors
        .iter()
        .map(|d| d.pointer.as_str())
        .collect();
    assert_eq!(pointers, vec!["#/info", "#/paths"]);

    // 3.1 only requires info
    let read = OpenApiReader::default()
        .read_str(r#"{"openapi": "3.1.0", "info": {"title": "t", "version": "1"}}"#)
        .unwrap();
    assert!(!read.diagnostic.has_errors());
}

#[test]
fn test_license_without_name_is_one_diagnostic() {
    let read = OpenApiReader::default().read_str(PETSTORE_V3).unwrap();
    let diagnostics = read
        .document
        .validate(&ValidationRuleSet::default_rule_set());

    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert_eq!(diagnostics[0].pointer, "#/info/license/name");
    assert_eq!(
        diagnostics[0].message,
        "The field 'name' in 'license' object is REQUIRED."
    );
}

#[test]
fn test_swagger_document_is_upgraded() {
    let read = OpenApiReader::default().read_str(PETSTORE_V2).unwrap();
    assert!(!read.diagnostic.has_errors(), "{:?}", read.diagnostic.errors);

    let document = read.document;
    assert_eq!(document.spec_version, Some(OpenApiSpecVersion::V2_0));
    assert_eq!(document.openapi, None);
    assert_eq!(
        document.servers[0].url.as_deref(),
        Some("https://petstore.example.com/v1")
    );

    let pets = document.paths.as_ref().unwrap().get("/pets").unwrap().as_inline().unwrap();

    let list = &pets.operations[&OperationType::Get];
    let limit = list.parameters[0].as_inline().unwrap();
    assert_eq!(limit.location, Some(ParameterLocation::Query));
    let schema = limit.schema.as_ref().unwrap();
    assert_eq!(schema.primary_type(), Some(JsonSchemaType::Integer));
    assert_eq!(schema.format().as_deref(), Some("int32"));

    let ok = list.responses.as_ref().unwrap().get("200").unwrap();
    let content = ok.content();
    let items = content["application/json"].schema.as_ref().unwrap().items().unwrap();
    let reference = items.as_reference().unwrap();
    assert_eq!(reference.reference_type, ReferenceType::Schema);
    assert_eq!(reference.id, "Pet");
    assert_eq!(items.required(), vec!["name".to_string()]);

    let create = &pets.operations[&OperationType::Post];
    assert!(create.parameters.is_empty());
    let body = create.request_body.as_ref().unwrap().as_inline().unwrap();
    assert!(body.required);
    assert_eq!(body.extensions.get("x-bodyName"), Some(&json!("pet")));
    let body_schema = body.content["application/json"].schema.as_ref().unwrap();
    assert_eq!(body_schema.properties().len(), 2);
}

#[test]
fn test_unknown_fields_survive_serialization() {
    let input = json!({
        "openapi": "3.0.0",
        "info": {"title": "t", "version": "1", "summary": "only in 3.1"},
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "cacheHint": {"maxAge": 60},
                    "responses": {"200": {"description": "ok"}}
                }
            }
        },
        "x-generator": "hand"
    });
    let read = OpenApiReader::default().read_value(&input).unwrap();
    assert_eq!(read.diagnostic.warnings.len(), 2);

    let written = serde_json::to_value(&*read.document).unwrap();
    assert_eq!(written["info"]["summary"], json!("only in 3.1"));
    assert_eq!(
        written["paths"]["/pets"]["get"]["cacheHint"],
        json!({"maxAge": 60})
    );
    assert_eq!(written["x-generator"], json!("hand"));
    assert_eq!(written["paths"]["/pets"]["get"]["operationId"], json!("listPets"));
}
