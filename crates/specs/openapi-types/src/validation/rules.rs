//! The built-in validation rules.

use super::{ValidationContext, ValidationRule, is_email, is_valid_component_key};
use crate::{
    Components, Contact, ExternalDocumentation, Info, License, OAuthFlows, Parameter,
    ParameterLocation, Response, Responses, Schema, Server, Tag,
};

pub const LICENSE_REQUIRED_FIELDS: &str = "LicenseRequiredFields";
pub const CONTACT_EMAIL_MUST_BE_EMAIL_ADDRESS: &str = "ContactEmailMustBeEmailAddress";
pub const EXTERNAL_DOCS_URL_IS_REQUIRED: &str = "ExternalDocsUrlIsRequired";
pub const INFO_REQUIRED_FIELDS: &str = "InfoRequiredFields";
pub const TAG_REQUIRED_FIELDS: &str = "TagRequiredFields";
pub const RESPONSE_REQUIRED_FIELDS: &str = "ResponseRequiredFields";
pub const RESPONSES_MUST_CONTAIN_AT_LEAST_ONE_RESPONSE: &str =
    "ResponsesMustContainAtLeastOneResponse";
pub const PARAMETER_REQUIRED_FIELDS: &str = "ParameterRequiredFields";
pub const PATH_PARAMETER_SHOULD_BE_REQUIRED: &str = "PathParameterShouldBeRequired";
pub const SERVER_REQUIRED_FIELDS: &str = "ServerRequiredFields";
pub const COMPONENT_KEY_MUST_MATCH_REGEX: &str = "KeyMustBeRegularExpression";
pub const SCHEMA_DISCRIMINATOR_IN_REQUIRED: &str = "ValidateSchemaDiscriminator";
pub const OAUTH_FLOW_REQUIRED_URLS: &str = "OAuthFlowRequiredUrls";

/// `The field '{0}' in '{1}' object is REQUIRED.`
pub fn field_is_required(field: &str, object: &str) -> String {
    format!("The field '{field}' in '{object}' object is REQUIRED.")
}

/// `The string '{0}' MUST be in the format of an email address.`
pub fn string_must_be_email_address(value: &str) -> String {
    format!("The string '{value}' MUST be in the format of an email address.")
}

/// Report `field` as missing on `object` when `present` is false
fn require(context: &mut ValidationContext, present: bool, field: &str, object: &str) {
    context.enter(field);
    if !present {
        context.create_error(field_is_required(field, object));
    }
    context.exit();
}

pub(crate) fn default_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::new::<License>(LICENSE_REQUIRED_FIELDS, |context, license| {
            require(context, license.name.is_some(), "name", "license");
        }),
        ValidationRule::new::<Contact>(CONTACT_EMAIL_MUST_BE_EMAIL_ADDRESS, |context, contact| {
            if let Some(email) = contact.email.as_deref() {
                if !is_email(email) {
                    context.enter("email");
                    context.create_error(string_must_be_email_address(email));
                    context.exit();
                }
            }
        }),
        ValidationRule::new::<ExternalDocumentation>(EXTERNAL_DOCS_URL_IS_REQUIRED, |context, docs| {
            require(context, docs.url.is_some(), "url", "External Documentation");
        }),
        ValidationRule::new::<Info>(INFO_REQUIRED_FIELDS, |context, info| {
            require(context, info.title.is_some(), "title", "info");
            require(context, info.version.is_some(), "version", "info");
        }),
        ValidationRule::new::<Tag>(TAG_REQUIRED_FIELDS, |context, tag| {
            require(context, tag.name.is_some(), "name", "tag");
        }),
        ValidationRule::new::<Response>(RESPONSE_REQUIRED_FIELDS, |context, response| {
            require(context, response.description.is_some(), "description", "response");
        }),
        ValidationRule::new::<Responses>(
            RESPONSES_MUST_CONTAIN_AT_LEAST_ONE_RESPONSE,
            |context, responses| {
                if responses.is_empty() {
                    context.create_error("Responses must contain at least one response");
                }
            },
        ),
        ValidationRule::new::<Parameter>(PARAMETER_REQUIRED_FIELDS, |context, parameter| {
            require(context, parameter.name.is_some(), "name", "parameter");
            require(context, parameter.location.is_some(), "in", "parameter");
        }),
        ValidationRule::new::<Parameter>(PATH_PARAMETER_SHOULD_BE_REQUIRED, |context, parameter| {
            if parameter.location == Some(ParameterLocation::Path) && !parameter.required {
                context.enter("required");
                context.create_error(format!(
                    "\"required\" must be true when parameter location is \"path\": '{}'",
                    parameter.name.as_deref().unwrap_or_default()
                ));
                context.exit();
            }
        }),
        ValidationRule::new::<Server>(SERVER_REQUIRED_FIELDS, |context, server| {
            require(context, server.url.is_some(), "url", "server");
        }),
        ValidationRule::new::<Components>(COMPONENT_KEY_MUST_MATCH_REGEX, |context, components| {
            for (bucket, keys) in components.keys() {
                for key in keys.into_iter().filter(|key| !is_valid_component_key(key)) {
                    context.enter(bucket);
                    context.create_error(format!(
                        "The key '{key}' in '{bucket}' of components MUST match the regular expression '^[a-zA-Z0-9\\.\\-_]+$'."
                    ));
                    context.exit();
                }
            }
        }),
        ValidationRule::new::<Schema>(SCHEMA_DISCRIMINATOR_IN_REQUIRED, |context, schema| {
            let Some(property) = schema
                .discriminator
                .as_ref()
                .and_then(|discriminator| discriminator.property_name.as_deref())
            else {
                return;
            };
            if !schema.required.iter().any(|name| name == property) {
                context.enter("discriminator");
                context.create_error(format!(
                    "Composite schema with discriminator property '{property}' MUST list it in 'required'."
                ));
                context.exit();
            }
        }),
        ValidationRule::new::<OAuthFlows>(OAUTH_FLOW_REQUIRED_URLS, |context, flows| {
            for (name, flow) in flows.iter() {
                let (needs_authorization, needs_token) = match name {
                    "implicit" => (true, false),
                    "authorizationCode" => (true, true),
                    _ => (false, true),
                };
                context.enter(name);
                if needs_authorization {
                    require(
                        context,
                        flow.authorization_url.is_some(),
                        "authorizationUrl",
                        "OAuth Flow",
                    );
                }
                if needs_token {
                    require(context, flow.token_url.is_some(), "tokenUrl", "OAuth Flow");
                }
                context.exit();
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use crate::validation::{Validate, ValidationRuleSet};
    use crate::{
        Components, Discriminator, OAuthFlow, OAuthFlows, Parameter, ParameterLocation, Schema,
        SecurityScheme, SecuritySchemeType, Server, Tag,
    };

    fn messages<T: Validate>(element: &T) -> Vec<(String, String)> {
        element
            .validate(&ValidationRuleSet::default_rule_set())
            .into_iter()
            .map(|d| (d.pointer, d.message))
            .collect()
    }

    #[test]
    fn test_path_parameter_must_be_required() {
        let mut parameter = Parameter::new("id", ParameterLocation::Path);
        assert!(messages(&parameter).is_empty());

        parameter.required = false;
        let found = messages(&parameter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "#/required");
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            messages(&Tag::default()),
            vec![("#/name".to_string(), "The field 'name' in 'tag' object is REQUIRED.".to_string())]
        );
        assert_eq!(
            messages(&Server::default()),
            vec![("#/url".to_string(), "The field 'url' in 'server' object is REQUIRED.".to_string())]
        );
    }

    #[test]
    fn test_component_keys() {
        let components = Components::new()
            .with_schema("Pet", Schema::object())
            .with_schema("Pet Store", Schema::object());
        let found = messages(&components);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "#/schemas");
        assert!(found[0].1.contains("'Pet Store'"));
    }

    #[test]
    fn test_discriminator_must_be_required() {
        let mut schema = Schema::object().with_property("petType", Schema::string());
        schema.discriminator = Some(Discriminator {
            property_name: Some("petType".to_string()),
            ..Discriminator::default()
        });
        assert_eq!(messages(&schema).len(), 1);

        let schema = schema.with_required("petType");
        assert!(messages(&schema).is_empty());
    }

    #[test]
    fn test_oauth_flow_urls() {
        let scheme = SecurityScheme::builder()
            .scheme_type(SecuritySchemeType::OAuth2)
            .flows(
                OAuthFlows::builder()
                    .authorization_code(OAuthFlow::default())
                    .build(),
            )
            .build();
        let pointers: Vec<_> = messages(&scheme).into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            pointers,
            vec![
                "#/flows/authorizationCode/authorizationUrl",
                "#/flows/authorizationCode/tokenUrl",
            ]
        );
    }
}
