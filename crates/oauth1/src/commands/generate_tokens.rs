//! `oauth1 generate-tokens` command implementation.

use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Args;
use oauth1_consumer::OAuthSession;
use oauth1_core::Token;

use super::ConsumerArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate-tokens command.
#[derive(Args, Debug)]
pub(crate) struct GenerateTokensArgs {
    /// HTTP method for the token endpoints.
    #[arg(short = 'm', long, default_value = "POST")]
    method: String,

    /// Callback URL sent with the request token request (default: from
    /// config, else `oob`).
    #[arg(long)]
    callback: Option<String>,

    #[command(flatten)]
    consumer: ConsumerArgs,
}

impl GenerateTokensArgs {
    /// Execute the generate-tokens command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is incomplete or a token request fails.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.consumer.load_config(config_path)?;
        let consumer = config.require_consumer()?;
        let mut session = OAuthSession::from_config(consumer)?;
        if let Some(callback) = &self.callback {
            session = session.with_callback(Some(callback))?;
        }

        let access_token = self.run(&mut session, &output, &mut io::stdin().lock())?;

        output.separator();
        output.success("OAuth Authorization Successful!");
        output.separator();
        output.info("\nAdd these credentials to your oauth1.toml:\n");
        write!(io::stdout(), "{}", toml_snippet(&access_token))?;

        Ok(())
    }

    /// Request token, user authorization, exchange.
    fn run(
        &self,
        session: &mut OAuthSession,
        output: &Output,
        input: &mut impl BufRead,
    ) -> Result<Token, CliError> {
        output.info("Step 1: Requesting temporary credentials...");
        let request_token = session.get_request_token(&self.method)?;
        output.success("Temporary token received");

        let auth_url = session.get_user_authorization_url_for_token(&request_token, None)?;
        output.separator();
        output.highlight("Step 2: Authorization Required");
        output.separator();
        output.info("\nPlease open this URL in your browser:");
        output.highlight(&format!("\n{auth_url}\n"));

        output.prompt("Enter the verification code (empty if none): ");
        let mut verifier = String::new();
        input.read_line(&mut verifier)?;
        let verifier = Some(verifier.trim()).filter(|verifier| !verifier.is_empty());

        output.info("\nStep 3: Exchanging for access token...");
        let access_token =
            session.exchange_request_token_for_access_token(&request_token, &self.method, verifier)?;
        Ok(access_token)
    }
}

/// `[consumer]` lines for the access token pair.
fn toml_snippet(access_token: &Token) -> String {
    format!(
        "[consumer]\nconsumer_key = \"{}\"\naccess_token = \"{}\"\naccess_token_secret = \"{}\"\n",
        access_token.consumer_key, access_token.token, access_token.token_secret
    )
}
