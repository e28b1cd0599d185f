//! `oauth1 sign` command implementation.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use oauth1_consumer::OAuthSession;
use oauth1_core::Token;

use super::{ConsumerArgs, parse_key_value};
use crate::error::CliError;

/// Arguments for the sign command.
#[derive(Args, Debug)]
pub(crate) struct SignArgs {
    /// HTTP method.
    method: String,

    /// Request URL, query included.
    url: String,

    /// Token to sign with (default: access token from config).
    #[arg(short = 't', long)]
    token: Option<String>,

    /// Secret of `--token`.
    #[arg(long, requires = "token")]
    token_secret: Option<String>,

    /// Extra query parameter, `key=value`. Repeatable.
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Form body parameter, `key=value`. Repeatable.
    #[arg(short = 'f', long = "form", value_parser = parse_key_value)]
    form: Vec<(String, String)>,

    #[command(flatten)]
    consumer: ConsumerArgs,
}

/// What a signed request would look like on the wire.
#[derive(Debug)]
pub(crate) struct SignedRequest {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) signature_base: String,
    pub(crate) authorization: Option<String>,
    pub(crate) body: Option<String>,
}

impl SignedRequest {
    fn render(&self) -> String {
        let mut out = format!(
            "Signature base string:\n{}\n\n{} {}\n",
            self.signature_base, self.method, self.url
        );
        if let Some(authorization) = &self.authorization {
            out.push_str(&format!("Authorization: {authorization}\n"));
        }
        if let Some(body) = &self.body {
            out.push_str(&format!("\n{body}\n"));
        }
        out
    }
}

impl SignArgs {
    /// Execute the sign command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or signing fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let config = self.consumer.load_config(config_path)?;
        let session = OAuthSession::from_config(config.require_consumer()?)?;

        let signed = self.sign(&session)?;
        write!(io::stdout(), "{}", signed.render())?;
        Ok(())
    }

    /// Sign the request without sending it.
    pub(crate) fn sign(&self, session: &OAuthSession) -> Result<SignedRequest, CliError> {
        let token = match &self.token {
            Some(token) => Some(Token::new(
                session.consumer_context.consumer_key.as_str(),
                token.as_str(),
                self.token_secret.as_deref().unwrap_or_default(),
            )),
            None => session.access_token.clone(),
        };
        let request = match &token {
            Some(token) => session.request_with_token(token),
            None => session.request(),
        };

        let mut request = request
            .for_method(&self.method.to_ascii_uppercase())
            .for_url(&self.url)?
            .with_query_parameters(self.params.iter().cloned())
            .with_form_parameters(self.form.iter().cloned())
            .sign_with_token()?;
        let description = request.request_description()?;
        let signature_base = request.context().clone().signature_base()?;

        Ok(SignedRequest {
            method: description.method,
            url: description.url.to_string(),
            signature_base,
            authorization: description.headers.get("Authorization").map(ToOwned::to_owned),
            body: description.body,
        })
    }
}
