//! Parameter legality checks and serialization

use std::collections::HashSet;

use graphlink_domain::{GraphError, GraphResult, Parameter, ParameterValue};

use crate::ports::Decoder;

/// Parameter carrying the access token; the client adds it itself.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";
/// Parameter carrying the IDs of a multi-object fetch.
pub const IDS_PARAM: &str = "ids";
/// Parameter carrying the app-secret proof.
pub const APPSECRET_PROOF_PARAM: &str = "appsecret_proof";
/// Parameter selecting the response format.
pub const FORMAT_PARAM: &str = "format";

/// Names a caller may never set.
pub const ALWAYS_RESERVED: &[&str] = &[ACCESS_TOKEN_PARAM];

/// Checks that no parameter uses a reserved name and no name repeats.
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending parameter.
pub fn verify_parameter_legality(parameters: &[Parameter], reserved: &[&str]) -> GraphResult<()> {
    let mut seen = HashSet::with_capacity(parameters.len());
    for parameter in parameters {
        let name = parameter.name();
        if name.trim().is_empty() {
            return Err(GraphError::invalid_argument("parameter name cannot be blank"));
        }
        if ALWAYS_RESERVED.contains(&name) || reserved.contains(&name) {
            return Err(GraphError::invalid_argument(format!(
                "parameter '{name}' is reserved and cannot be set by the caller"
            )));
        }
        if !seen.insert(name) {
            return Err(GraphError::invalid_argument(format!(
                "parameter '{name}' is specified more than once"
            )));
        }
    }
    Ok(())
}

/// Renders a parameter value to the string sent on the wire.
///
/// Text values are sent as-is. JSON strings are unwrapped; any other JSON
/// value is rendered by the decoder.
///
/// # Errors
///
/// Propagates the decoder's failure to serialize the value.
pub fn render_value<D: Decoder>(decoder: &D, value: &ParameterValue) -> GraphResult<String> {
    value.render_with(|json| decoder.encode(json))
}

/// Checks and serializes caller parameters into a form-encoded string.
///
/// Caller parameters keep their order. The configured access token and
/// `format=json` are appended after them.
///
/// # Errors
///
/// Returns `InvalidArgument` for reserved or duplicate names.
pub fn encode<D: Decoder>(
    decoder: &D,
    parameters: &[Parameter],
    reserved: &[&str],
    access_token: Option<&str>,
) -> GraphResult<String> {
    verify_parameter_legality(parameters, reserved)?;

    let mut pairs = Vec::with_capacity(parameters.len() + 2);
    for parameter in parameters {
        pairs.push((
            parameter.name().to_string(),
            render_value(decoder, parameter.value())?,
        ));
    }
    if let Some(token) = access_token {
        pairs.push((ACCESS_TOKEN_PARAM.to_string(), token.to_string()));
    }
    pairs.push((FORMAT_PARAM.to_string(), "json".to_string()));

    serde_urlencoded::to_string(&pairs)
        .map_err(|e| GraphError::invalid_argument(format!("cannot encode parameters: {e}")))
}
