//! Fluent builder for signed consumer requests.

use oauth1_core::encoding::{format_query_string, parse_form_encoded, url_encode};
use oauth1_core::parameters::names;
use oauth1_core::{OAuthContext, OAuthError, ParameterCollection, ProblemReport, Token};
use tracing::{debug, warn};
use url::Url;

use crate::consumer_context::OAuthConsumerContext;
use crate::error::ConsumerError;
use crate::transport::{RequestDescription, Transport, TransportResponse};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A request under construction, signed on demand.
///
/// The request is signed the first time its description is built, with the
/// token when one is attached and without it otherwise.
pub struct ConsumerRequest<'a> {
    context: OAuthContext,
    consumer_context: &'a OAuthConsumerContext,
    transport: &'a dyn Transport,
    token: Option<Token>,
    request_body: Option<String>,
    accepts_type: Option<String>,
}

impl<'a> ConsumerRequest<'a> {
    pub fn new(
        context: OAuthContext,
        consumer_context: &'a OAuthConsumerContext,
        transport: &'a dyn Transport,
        token: Option<Token>,
    ) -> Self {
        Self {
            context,
            consumer_context,
            transport,
            token,
            request_body: None,
            accepts_type: None,
        }
    }

    pub fn context(&self) -> &OAuthContext {
        &self.context
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn for_method(mut self, method: &str) -> Self {
        self.context.set_request_method(method);
        self
    }

    #[must_use]
    pub fn get(self) -> Self {
        self.for_method("GET")
    }

    #[must_use]
    pub fn post(self) -> Self {
        self.for_method("POST")
    }

    #[must_use]
    pub fn put(self) -> Self {
        self.for_method("PUT")
    }

    #[must_use]
    pub fn delete(self) -> Self {
        self.for_method("DELETE")
    }

    #[must_use]
    pub fn for_uri(mut self, uri: Url) -> Self {
        self.context.set_raw_uri(uri);
        self
    }

    /// # Errors
    ///
    /// Returns an error if `url` cannot be parsed.
    pub fn for_url(self, url: &str) -> Result<Self, ConsumerError> {
        Ok(self.for_uri(Url::parse(url)?))
    }

    #[must_use]
    pub fn with_form_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.context.form_encoded_parameters.extend(parameters);
        self
    }

    #[must_use]
    pub fn with_query_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.context.query_parameters.extend(parameters);
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.context.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.context.cookies.extend(cookies);
        self
    }

    /// Text body, sent URL-encoded when there are no form parameters.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Raw body bytes, covered by `oauth_body_hash` when body hashes are on.
    #[must_use]
    pub fn with_raw_content(
        mut self,
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        self.context.raw_content = Some(content.into());
        self.context.raw_content_type = Some(content_type.into());
        self
    }

    /// Value of the `Accept` header.
    #[must_use]
    pub fn with_accepts_type(mut self, accepts_type: impl Into<String>) -> Self {
        self.accepts_type = Some(accepts_type.into());
        self
    }

    /// Run `alteration` on the underlying context.
    #[must_use]
    pub fn alter_context(mut self, alteration: impl FnOnce(&mut OAuthContext)) -> Self {
        alteration(&mut self.context);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConsumerError::AlreadySigned`] if the request carries a
    /// signature, or the signing error.
    pub fn sign_without_token(mut self) -> Result<Self, ConsumerError> {
        self.ensure_not_signed()?;
        self.consumer_context.sign_context(&mut self.context)?;
        Ok(self)
    }

    /// Sign with the attached token, or without a token when none is attached.
    ///
    /// # Errors
    ///
    /// See [`sign_without_token`](Self::sign_without_token).
    pub fn sign_with_token(mut self) -> Result<Self, ConsumerError> {
        self.ensure_not_signed()?;
        self.sign()?;
        Ok(self)
    }

    /// Attach `token` and sign with it.
    ///
    /// # Errors
    ///
    /// See [`sign_without_token`](Self::sign_without_token).
    pub fn sign_with(mut self, token: &Token) -> Result<Self, ConsumerError> {
        self.token = Some(token.clone());
        self.sign_with_token()
    }

    /// Build the description of the HTTP request, signing first if needed.
    ///
    /// The body is the form parameters (token secret excluded) when there
    /// are any, else the URL-encoded text body, else the raw content. The
    /// `Authorization` header is added when the context uses it.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails or the request URL is missing.
    pub fn request_description(&mut self) -> Result<RequestDescription, ConsumerError> {
        if self.context.signature().is_none() {
            self.sign()?;
        }

        let method = self.context.request_method().unwrap_or("GET").to_owned();
        let mut description = RequestDescription::new(method, self.context.generate_uri()?);

        if !self.context.form_encoded_parameters.is_empty() {
            description.content_type = Some(FORM_CONTENT_TYPE.to_owned());
            description.body = Some(format_query_string(
                self.context
                    .form_encoded_parameters
                    .iter_excluding(&[names::OAUTH_TOKEN_SECRET]),
            ));
        } else if let Some(body) = &self.request_body {
            description.body = Some(url_encode(body));
        } else if let Some(raw_content) = &self.context.raw_content {
            description.raw_body = Some(raw_content.clone());
            description.content_type.clone_from(&self.context.raw_content_type);
        }

        description.headers.extend(self.context.headers.iter());
        if self.context.use_authorization_header {
            description
                .headers
                .set("Authorization", self.context.authorization_header());
        }
        if let Some(accepts_type) = &self.accepts_type {
            description.headers.set("Accept", accepts_type.as_str());
        }
        if let Some(user_agent) = &self.consumer_context.user_agent {
            description.headers.set("User-Agent", user_agent.as_str());
        }

        Ok(description)
    }

    /// Send the request.
    ///
    /// An error status whose body carries `oauth_problem` becomes a
    /// [`ConsumerError::Core`] with the parsed problem report; other error
    /// statuses become [`ConsumerError::HttpResponse`].
    ///
    /// # Errors
    ///
    /// Returns an error if signing or sending fails or the provider answers
    /// with an error status.
    pub fn execute(mut self) -> Result<TransportResponse, ConsumerError> {
        let description = self.request_description()?;
        let response = self.transport.execute(&description)?;

        if response.is_success() {
            return Ok(response);
        }

        if response.body.contains(names::OAUTH_PROBLEM) {
            let report = ProblemReport::parse(&response.body);
            warn!(
                status = response.status,
                problem = report.problem.as_ref().map(|p| p.as_str()).unwrap_or_default(),
                "provider reported an OAuth problem"
            );
            return Err(OAuthError::from_report(report).into());
        }

        Err(ConsumerError::HttpResponse {
            status: response.status,
            body: response.body,
        })
    }

    /// Send the request and return the response body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn read_body(self) -> Result<String, ConsumerError> {
        Ok(self.execute()?.body)
    }

    /// Send the request and parse the form-encoded response body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn to_body_parameters(self) -> Result<ParameterCollection, ConsumerError> {
        let body = self.read_body()?;
        debug!(length = body.len(), "parsing form-encoded response");
        Ok(parse_form_encoded(&body))
    }

    fn sign(&mut self) -> Result<(), ConsumerError> {
        match &self.token {
            Some(token) => self
                .consumer_context
                .sign_context_with_token(&mut self.context, token),
            None => self.consumer_context.sign_context(&mut self.context),
        }
    }

    fn ensure_not_signed(&self) -> Result<(), ConsumerError> {
        if self.context.signature().is_some() {
            return Err(ConsumerError::AlreadySigned);
        }
        Ok(())
    }
}
