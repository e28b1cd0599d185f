//! Consumer session: endpoints, the token flows and authorized requests.

use std::time::Duration;

use oauth1_config::ConsumerConfig;
use oauth1_core::encoding::{format_query_string, parse_form_encoded};
use oauth1_core::parameters::names;
use oauth1_core::{OAuthContext, ParameterCollection, Token, TokenResponse};
use tracing::debug;
use url::Url;

use crate::consumer_context::OAuthConsumerContext;
use crate::error::ConsumerError;
use crate::request::ConsumerRequest;
use crate::transport::{Transport, UreqTransport};

/// Callback value sent when the consumer cannot receive callbacks.
const OUT_OF_BAND: &str = "oob";

/// A consumer's conversation with one provider.
///
/// Holds the consumer credentials, the three token endpoints, the callback
/// and the current access token. Session-level cookies, form parameters,
/// headers and query parameters are copied into every request it creates.
pub struct OAuthSession {
    pub consumer_context: OAuthConsumerContext,
    pub request_token_uri: Option<Url>,
    pub user_authorize_uri: Option<Url>,
    pub access_token_uri: Option<Url>,
    /// `None` sends `oauth_callback=oob`.
    pub callback_uri: Option<Url>,
    pub access_token: Option<Token>,
    /// Sign `oauth_body_hash` for raw request bodies.
    pub add_body_hashes_to_raw_requests: bool,
    /// Reject request tokens the provider did not confirm the callback for.
    pub callback_must_be_confirmed: bool,
    cookies: ParameterCollection,
    form_parameters: ParameterCollection,
    headers: ParameterCollection,
    query_parameters: ParameterCollection,
    transport: Box<dyn Transport>,
}

impl OAuthSession {
    /// Create a session without endpoints.
    pub fn new(consumer_context: OAuthConsumerContext) -> Self {
        Self {
            consumer_context,
            request_token_uri: None,
            user_authorize_uri: None,
            access_token_uri: None,
            callback_uri: None,
            access_token: None,
            add_body_hashes_to_raw_requests: false,
            callback_must_be_confirmed: false,
            cookies: ParameterCollection::new(),
            form_parameters: ParameterCollection::new(),
            headers: ParameterCollection::new(),
            query_parameters: ParameterCollection::new(),
            transport: Box::new(UreqTransport::default()),
        }
    }

    /// Create a session for the provider's three token endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL cannot be parsed.
    pub fn with_endpoints(
        consumer_context: OAuthConsumerContext,
        request_token_url: &str,
        user_authorize_url: &str,
        access_token_url: &str,
    ) -> Result<Self, ConsumerError> {
        let mut session = Self::new(consumer_context);
        session.request_token_uri = Some(Url::parse(request_token_url)?);
        session.user_authorize_uri = Some(Url::parse(user_authorize_url)?);
        session.access_token_uri = Some(Url::parse(access_token_url)?);
        Ok(session)
    }

    /// Build a session from the `[consumer]` config section.
    ///
    /// A configured access token pair becomes the session's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer context cannot be built or a URL is
    /// invalid.
    pub fn from_config(config: &ConsumerConfig) -> Result<Self, ConsumerError> {
        let parse = |url: &Option<String>| url.as_deref().map(Url::parse).transpose();

        let mut session = Self::new(OAuthConsumerContext::from_config(config)?)
            .with_callback(config.callback_url.as_deref())?
            .with_transport(UreqTransport::new(Duration::from_secs(config.timeout_secs)));
        session.request_token_uri = parse(&config.request_token_url)?;
        session.user_authorize_uri = parse(&config.user_authorize_url)?;
        session.access_token_uri = parse(&config.access_token_url)?;
        session.callback_must_be_confirmed = config.callback_must_be_confirmed;
        session.add_body_hashes_to_raw_requests = config.add_body_hashes;
        if let (Some(token), Some(secret)) = (&config.access_token, &config.access_token_secret) {
            session.access_token = Some(Token::new(
                config.consumer_key.as_str(),
                token.as_str(),
                secret.as_str(),
            ));
        }
        Ok(session)
    }

    /// Set the callback URL. Empty, `oob` (any case) and `None` mean
    /// out-of-band.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback URL cannot be parsed.
    pub fn with_callback(mut self, callback: Option<&str>) -> Result<Self, ConsumerError> {
        self.callback_uri = match callback {
            None => None,
            Some(url) if url.is_empty() || url.eq_ignore_ascii_case(OUT_OF_BAND) => None,
            Some(url) => Some(Url::parse(url)?),
        };
        Ok(self)
    }

    /// Replace the HTTP transport.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, access_token: Token) -> Self {
        self.access_token = Some(access_token);
        self
    }

    #[must_use]
    pub fn enable_oauth_request_body_hashes(mut self) -> Self {
        self.add_body_hashes_to_raw_requests = true;
        self
    }

    #[must_use]
    pub fn requires_callback_confirmation(mut self) -> Self {
        self.callback_must_be_confirmed = true;
        self
    }

    /// Cookies sent with every request. Existing names are replaced.
    #[must_use]
    pub fn with_cookies<'p>(mut self, cookies: impl IntoIterator<Item = (&'p str, &'p str)>) -> Self {
        set_all(&mut self.cookies, cookies);
        self
    }

    #[must_use]
    pub fn with_form_parameters<'p>(
        mut self,
        parameters: impl IntoIterator<Item = (&'p str, &'p str)>,
    ) -> Self {
        set_all(&mut self.form_parameters, parameters);
        self
    }

    #[must_use]
    pub fn with_headers<'p>(mut self, headers: impl IntoIterator<Item = (&'p str, &'p str)>) -> Self {
        set_all(&mut self.headers, headers);
        self
    }

    /// Query parameters sent with every request and added to user
    /// authorization URLs.
    #[must_use]
    pub fn with_query_parameters<'p>(
        mut self,
        parameters: impl IntoIterator<Item = (&'p str, &'p str)>,
    ) -> Self {
        set_all(&mut self.query_parameters, parameters);
        self
    }

    /// Start a request authorized by the session's access token.
    pub fn request(&self) -> ConsumerRequest<'_> {
        self.create_request(self.access_token.clone())
    }

    /// Start a request authorized by `access_token`.
    pub fn request_with_token(&self, access_token: &Token) -> ConsumerRequest<'_> {
        self.create_request(Some(access_token.clone()))
    }

    /// Signed request for temporary credentials, carrying `oauth_callback`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::MissingEndpoint`] without a request token
    /// endpoint, or the signing error.
    pub fn build_request_token_context(
        &self,
        method: &str,
    ) -> Result<ConsumerRequest<'_>, ConsumerError> {
        let uri = self
            .request_token_uri
            .clone()
            .ok_or(ConsumerError::MissingEndpoint("request token"))?;
        let callback = self
            .callback_uri
            .as_ref()
            .map_or_else(|| OUT_OF_BAND.to_owned(), Url::to_string);

        self.create_request(None)
            .for_method(method)
            .alter_context(|context| context.set_callback_url(&callback))
            .for_uri(uri)
            .sign_without_token()
    }

    /// Signed request exchanging an authorized request token.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::MissingEndpoint`] without an access token
    /// endpoint, or the signing error.
    pub fn build_exchange_request_token_for_access_token_context(
        &self,
        request_token: &Token,
        method: &str,
        verifier: Option<&str>,
    ) -> Result<ConsumerRequest<'_>, ConsumerError> {
        let uri = self.access_token_endpoint()?;

        self.create_request(None)
            .for_method(method)
            .alter_context(|context| context.set_verifier(verifier.unwrap_or_default()))
            .for_uri(uri)
            .sign_with(request_token)
    }

    /// Signed xAuth request for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::MissingEndpoint`] without an access token
    /// endpoint, or the signing error.
    pub fn build_access_token_context(
        &self,
        method: &str,
        x_auth_mode: &str,
        x_auth_username: &str,
        x_auth_password: &str,
    ) -> Result<ConsumerRequest<'_>, ConsumerError> {
        let uri = self.access_token_endpoint()?;

        self.create_request(None)
            .for_method(method)
            .alter_context(|context| {
                context.set_x_auth_username(x_auth_username);
                context.set_x_auth_password(x_auth_password);
                context.set_x_auth_mode(x_auth_mode);
            })
            .for_uri(uri)
            .sign_without_token()
    }

    /// Signed request renewing `access_token` with its session handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::MissingEndpoint`] without an access token
    /// endpoint, or the signing error.
    pub fn build_renew_access_token_context(
        &self,
        access_token: &Token,
        method: &str,
        session_handle: &str,
    ) -> Result<ConsumerRequest<'_>, ConsumerError> {
        let uri = self.access_token_endpoint()?;

        self.create_request(None)
            .for_method(method)
            .alter_context(|context| context.set_session_handle(session_handle))
            .for_uri(uri)
            .sign_with(access_token)
    }

    /// Obtain a request token.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::CallbackNotConfirmed`] when confirmation is
    /// required and missing, or any request error.
    pub fn get_request_token(&self, method: &str) -> Result<Token, ConsumerError> {
        let body = self.build_request_token_context(method)?.read_body()?;
        let response = TokenResponse::parse(&body);

        if !response.callback_confirmed && self.callback_must_be_confirmed {
            return Err(ConsumerError::CallbackNotConfirmed);
        }

        let token = into_token(response, &self.consumer_context.consumer_key)?;
        debug!(token = %token.token, "received request token");
        Ok(token)
    }

    /// Exchange an authorized request token for an access token and keep it
    /// as the session's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no token.
    pub fn exchange_request_token_for_access_token(
        &mut self,
        request_token: &Token,
        method: &str,
        verifier: Option<&str>,
    ) -> Result<Token, ConsumerError> {
        let body = self
            .build_exchange_request_token_for_access_token_context(request_token, method, verifier)?
            .read_body()?;
        let token = into_token(TokenResponse::parse(&body), &request_token.consumer_key)?;
        debug!(token = %token.token, "received access token");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    /// Obtain an access token with xAuth credentials and keep it as the
    /// session's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no token.
    pub fn get_access_token_using_xauth(
        &mut self,
        method: &str,
        x_auth_mode: &str,
        x_auth_username: &str,
        x_auth_password: &str,
    ) -> Result<Token, ConsumerError> {
        let body = self
            .build_access_token_context(method, x_auth_mode, x_auth_username, x_auth_password)?
            .read_body()?;
        let token = into_token(
            TokenResponse::parse(&body),
            &self.consumer_context.consumer_key,
        )?;
        debug!(token = %token.token, "received xAuth access token");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    /// Renew `access_token` and keep the new token as the session's access
    /// token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no token.
    pub fn renew_access_token(
        &mut self,
        access_token: &Token,
        method: &str,
        session_handle: &str,
    ) -> Result<Token, ConsumerError> {
        let body = self
            .build_renew_access_token_context(access_token, method, session_handle)?
            .read_body()?;
        let token = into_token(TokenResponse::parse(&body), &access_token.consumer_key)?;
        debug!(token = %token.token, "renewed access token");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    /// URL the user visits to authorize `token`.
    ///
    /// Keeps the authorize endpoint's own query, then the session query
    /// parameters, then `oauth_token` and the optional `oauth_callback`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::MissingEndpoint`] without a user
    /// authorization endpoint.
    pub fn get_user_authorization_url_for_token(
        &self,
        token: &Token,
        callback_url: Option<&str>,
    ) -> Result<String, ConsumerError> {
        let authorize_uri = self
            .user_authorize_uri
            .as_ref()
            .ok_or(ConsumerError::MissingEndpoint("user authorization"))?;

        let mut parameters = parse_form_encoded(authorize_uri.query().unwrap_or_default());
        parameters.extend(self.query_parameters.iter());
        parameters.set(names::OAUTH_TOKEN, token.token.as_str());
        if let Some(callback_url) = callback_url.filter(|url| !url.is_empty()) {
            parameters.set(names::OAUTH_CALLBACK, callback_url);
        }

        let mut base = authorize_uri.clone();
        base.set_query(None);
        Ok(format!("{base}?{}", format_query_string(parameters.iter())))
    }

    fn access_token_endpoint(&self) -> Result<Url, ConsumerError> {
        self.access_token_uri
            .clone()
            .ok_or(ConsumerError::MissingEndpoint("access token"))
    }

    fn create_request(&self, token: Option<Token>) -> ConsumerRequest<'_> {
        let mut context = OAuthContext::new();
        context.use_authorization_header = self.consumer_context.use_header_for_oauth_parameters;
        context.include_body_hash_in_signature = self.add_body_hashes_to_raw_requests;
        context.cookies.extend(self.cookies.iter());
        context.form_encoded_parameters.extend(self.form_parameters.iter());
        context.headers.extend(self.headers.iter());
        context.query_parameters.extend(self.query_parameters.iter());

        ConsumerRequest::new(
            context,
            &self.consumer_context,
            self.transport.as_ref(),
            token,
        )
    }
}

fn set_all<'p>(
    destination: &mut ParameterCollection,
    additions: impl IntoIterator<Item = (&'p str, &'p str)>,
) {
    for (name, value) in additions {
        destination.set(name, value);
    }
}

fn into_token(response: TokenResponse, consumer_key: &str) -> Result<Token, ConsumerError> {
    response.into_token(consumer_key).ok_or_else(|| {
        ConsumerError::InvalidResponse(format!("missing {}", names::OAUTH_TOKEN))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use oauth1_core::Problem;
    use pretty_assertions::assert_eq;

    fn get_session(consumer_context: OAuthConsumerContext) -> OAuthSession {
        OAuthSession::with_endpoints(
            consumer_context,
            "http://localhost/request",
            "http://localhost/userauth",
            "http://localhost/access",
        )
        .unwrap()
    }

    fn access_token() -> Token {
        Token::new("consumer", "token", "secret")
    }

    #[test]
    fn test_context_only_session() {
        let session = OAuthSession::new(OAuthConsumerContext::default());

        assert!(session.request_token_uri.is_none());
        assert!(session.access_token.is_none());
    }

    #[test]
    fn test_raw_body_includes_body_hash() {
        let consumer = OAuthConsumerContext::new("consumer").with_header_for_oauth_parameters(true);
        let session = get_session(consumer).enable_oauth_request_body_hashes();
        let raw_contents = b"Hello World!".to_vec();

        let mut request = session
            .request_with_token(&access_token())
            .post()
            .for_url("http://localhost/resource")
            .unwrap()
            .with_raw_content(raw_contents.clone(), "text/plain");
        let description = request.request_description().unwrap();

        assert_eq!(description.raw_body, Some(raw_contents));
        assert!(
            description
                .headers
                .get("Authorization")
                .unwrap()
                .contains("oauth_body_hash=\"Lve95gjOVATpfV8EL5X4nxwjKHE%3D\"")
        );
    }

    #[test]
    fn test_request_token_with_callback_url() {
        let session = get_session(OAuthConsumerContext::new("key"))
            .with_callback(Some("http://localhost/callback"))
            .unwrap();

        let mut request = session.build_request_token_context("POST").unwrap();
        let description = request.request_description().unwrap();

        assert!(
            description
                .body
                .unwrap()
                .contains("oauth_callback=http%3A%2F%2Flocalhost%2Fcallback")
        );
    }

    #[test]
    fn test_request_token_without_callback_url() {
        let session = get_session(OAuthConsumerContext::new("key"));

        let mut request = session.build_request_token_context("POST").unwrap();
        let description = request.request_description().unwrap();

        assert!(description.body.unwrap().contains("oauth_callback=oob"));
    }

    #[test]
    fn test_oob_callback_is_out_of_band() {
        let session = get_session(OAuthConsumerContext::new("key"))
            .with_callback(Some("OOB"))
            .unwrap();

        assert!(session.callback_uri.is_none());
    }

    #[test]
    fn test_request_token_get_does_not_populate_body() {
        let session = get_session(OAuthConsumerContext::new("key"));

        let mut request = session.build_request_token_context("GET").unwrap();
        let description = request.request_description().unwrap();

        assert_eq!(description.body, None);
        assert_eq!(description.content_type, None);
        assert_eq!(description.method, "GET");
        assert!(description.url.as_str().contains("oauth_callback=oob"));
    }

    #[test]
    fn test_request_token_missing_endpoint() {
        let session = OAuthSession::new(OAuthConsumerContext::new("key"));

        let err = session.build_request_token_context("GET").err().unwrap();

        assert!(matches!(err, ConsumerError::MissingEndpoint("request token")));
    }

    #[test]
    fn test_user_authorization_url_with_callback() {
        let session = get_session(OAuthConsumerContext::default());

        let actual = session
            .get_user_authorization_url_for_token(
                &Token::new("", "token", ""),
                Some("http://localhost/callback"),
            )
            .unwrap();

        assert_eq!(
            actual,
            "http://localhost/userauth?oauth_token=token&oauth_callback=http%3A%2F%2Flocalhost%2Fcallback"
        );
    }

    #[test]
    fn test_user_authorization_url_without_callback() {
        let session = get_session(OAuthConsumerContext::default());

        let actual = session
            .get_user_authorization_url_for_token(&Token::new("", "token", ""), None)
            .unwrap();

        assert_eq!(actual, "http://localhost/userauth?oauth_token=token");
    }

    #[test]
    fn test_user_authorization_url_keeps_existing_query() {
        let session = OAuthSession::with_endpoints(
            OAuthConsumerContext::default(),
            "http://localhost/request",
            "http://localhost/userauth?app=photos",
            "http://localhost/access",
        )
        .unwrap()
        .with_query_parameters([("lang", "en")]);

        let actual = session
            .get_user_authorization_url_for_token(&Token::new("", "token", ""), None)
            .unwrap();

        assert_eq!(
            actual,
            "http://localhost/userauth?app=photos&lang=en&oauth_token=token"
        );
    }

    #[test]
    fn test_token_secret_not_in_authorization_header() {
        let consumer = OAuthConsumerContext::new("consumer").with_header_for_oauth_parameters(true);
        let session = get_session(consumer);

        let mut request = session
            .request_with_token(&access_token())
            .post()
            .for_url("http://localhost/")
            .unwrap()
            .sign_with_token()
            .unwrap();
        let description = request.request_description().unwrap();

        assert!(
            !description
                .headers
                .get("Authorization")
                .unwrap()
                .contains("oauth_token_secret")
        );
    }

    #[test]
    fn test_token_secret_not_in_post_body() {
        let session = get_session(OAuthConsumerContext::new("consumer"));

        let mut request = session
            .request_with_token(&access_token())
            .post()
            .for_url("http://localhost/")
            .unwrap()
            .sign_with_token()
            .unwrap();
        let description = request.request_description().unwrap();

        assert!(!description.body.unwrap().contains("oauth_token_secret"));
    }

    #[test]
    fn test_token_secret_not_in_get_query() {
        let session = get_session(OAuthConsumerContext::new("consumer"));

        let mut request = session
            .request_with_token(&access_token())
            .get()
            .for_url("http://localhost/")
            .unwrap()
            .sign_with_token()
            .unwrap();
        let description = request.request_description().unwrap();

        assert!(!description.url.as_str().contains("oauth_token_secret"));
    }

    #[test]
    fn test_session_parameters_copied_into_requests() {
        let session = get_session(OAuthConsumerContext::new("consumer"))
            .with_headers([("X-Trace", "abc")])
            .with_cookies([("session", "1")])
            .with_query_parameters([("lang", "en")]);

        let request = session.request().get();

        assert_eq!(request.context().headers.get("X-Trace"), Some("abc"));
        assert_eq!(request.context().cookies.get("session"), Some("1"));
        assert_eq!(request.context().query_parameters.get("lang"), Some("en"));
    }

    #[test]
    fn test_get_request_token() {
        let transport = RecordingTransport::new().with_response(
            200,
            "oauth_token=requestkey&oauth_token_secret=requestsecret&oauth_callback_confirmed=true",
        );
        let session = get_session(OAuthConsumerContext::new("key"))
            .requires_callback_confirmation()
            .with_transport(transport.clone());

        let token = session.get_request_token("GET").unwrap();

        assert_eq!(token, Token::new("key", "requestkey", "requestsecret"));
        let sent = transport.last_request().unwrap();
        assert!(sent.url.as_str().starts_with("http://localhost/request?"));
    }

    #[test]
    fn test_get_request_token_requires_confirmation() {
        let transport = RecordingTransport::new()
            .with_response(200, "oauth_token=requestkey&oauth_token_secret=requestsecret");
        let session = get_session(OAuthConsumerContext::new("key"))
            .requires_callback_confirmation()
            .with_transport(transport);

        let err = session.get_request_token("GET").unwrap_err();

        assert!(matches!(err, ConsumerError::CallbackNotConfirmed));
    }

    #[test]
    fn test_get_request_token_without_token_in_response() {
        let transport = RecordingTransport::new().with_response(200, "unexpected=1");
        let session = get_session(OAuthConsumerContext::new("key")).with_transport(transport);

        let err = session.get_request_token("GET").unwrap_err();

        assert!(matches!(err, ConsumerError::InvalidResponse(_)));
    }

    #[test]
    fn test_exchange_request_token_stores_access_token() {
        let transport = RecordingTransport::new().with_response(
            200,
            "oauth_token=accesskey&oauth_token_secret=accesssecret&oauth_session_handle=handle",
        );
        let mut session = get_session(OAuthConsumerContext::new("key")).with_transport(transport.clone());
        let request_token = Token::new("key", "requestkey", "requestsecret");

        let token = session
            .exchange_request_token_for_access_token(&request_token, "GET", Some("verifier"))
            .unwrap();

        assert_eq!(token.token, "accesskey");
        assert_eq!(token.session_handle.as_deref(), Some("handle"));
        assert_eq!(session.access_token, Some(token));
        let sent = transport.last_request().unwrap();
        assert!(sent.url.as_str().contains("oauth_verifier=verifier"));
        assert!(sent.url.as_str().contains("oauth_token=requestkey"));
    }

    #[test]
    fn test_xauth_sends_credentials() {
        let transport = RecordingTransport::new()
            .with_response(200, "oauth_token=accesskey&oauth_token_secret=accesssecret");
        let mut session = get_session(OAuthConsumerContext::new("key")).with_transport(transport.clone());

        let token = session
            .get_access_token_using_xauth("POST", "client_auth", "john", "password")
            .unwrap();

        assert_eq!(token.consumer_key, "key");
        let body = transport.last_request().unwrap().body.unwrap();
        assert!(body.contains("x_auth_mode=client_auth"));
        assert!(body.contains("x_auth_username=john"));
        assert!(body.contains("x_auth_password=password"));
    }

    #[test]
    fn test_renew_access_token_sends_session_handle() {
        let transport = RecordingTransport::new()
            .with_response(200, "oauth_token=renewed&oauth_token_secret=renewedsecret");
        let mut session = get_session(OAuthConsumerContext::new("key")).with_transport(transport.clone());
        let mut current = Token::new("key", "accesskey", "accesssecret");
        current.session_handle = Some("handle".to_owned());

        let token = session
            .renew_access_token(&current, "GET", "handle")
            .unwrap();

        assert_eq!(token.token, "renewed");
        assert!(
            transport
                .last_request()
                .unwrap()
                .url
                .as_str()
                .contains("oauth_session_handle=handle")
        );
    }

    #[test]
    fn test_provider_problem_is_translated() {
        let transport = RecordingTransport::new().with_response(
            401,
            "oauth_problem=parameter_absent&oauth_parameters_absent=oauth_callback",
        );
        let session = get_session(OAuthConsumerContext::new("key")).with_transport(transport);

        let err = session.get_request_token("GET").unwrap_err();
        let report = err.report().unwrap();

        assert_eq!(report.problem, Some(Problem::ParameterAbsent));
        assert_eq!(report.parameters_absent, vec!["oauth_callback".to_owned()]);
    }

    #[test]
    fn test_from_config() {
        let mut config = ConsumerConfig::new("key");
        config.consumer_secret = Some("secret".to_owned());
        config.request_token_url = Some("https://provider.example.com/request".to_owned());
        config.access_token_url = Some("https://provider.example.com/access".to_owned());
        config.callback_url = Some("https://consumer.example.com/callback".to_owned());
        config.callback_must_be_confirmed = true;

        let session = OAuthSession::from_config(&config).unwrap();

        assert_eq!(
            session.request_token_uri.unwrap().as_str(),
            "https://provider.example.com/request"
        );
        assert!(session.user_authorize_uri.is_none());
        assert_eq!(
            session.callback_uri.unwrap().as_str(),
            "https://consumer.example.com/callback"
        );
        assert!(session.callback_must_be_confirmed);
        assert!(session.consumer_context.use_header_for_oauth_parameters);
        assert!(session.access_token.is_none());
    }

    #[test]
    fn test_from_config_with_access_token() {
        let mut config = ConsumerConfig::new("key");
        config.access_token = Some("accesskey".to_owned());
        config.access_token_secret = Some("accesssecret".to_owned());

        let session = OAuthSession::from_config(&config).unwrap();

        let token = session.access_token.unwrap();
        assert_eq!(token.consumer_key, "key");
        assert_eq!(token.token, "accesskey");
        assert_eq!(token.token_secret, "accesssecret");
    }
}
