use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use time::{OffsetDateTime, Weekday};
use tracing::{debug, warn};

use crate::data_source::{HistoryRequest, HistorySource, SourceError};
use crate::http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
use crate::{Observation, PriceHistory, PriceSeries, ProviderId, Symbol, ValidationError};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";

// ============================================================================
// Yahoo Auth Manager - Handles cookie/crumb authentication
// ============================================================================

/// Caches the Yahoo Finance crumb token.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (kept by the client's cookie jar)
/// 2. Crumb token from query1.finance.yahoo.com/v1/test/getcrumb
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<(String, Instant)>>,
    refreshing: AtomicBool,
    ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            refreshing: AtomicBool::new(false),
            ttl: Duration::from_secs(3600),
        }
    }
}

impl YahooAuthManager {
    fn cached_crumb(&self) -> Option<String> {
        let guard = self.crumb.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.ttl)
            .map(|(crumb, _)| crumb.clone())
    }

    /// Current crumb, fetching a new one when missing or expired.
    pub async fn get_crumb(&self, http_client: &Arc<dyn HttpClient>) -> Result<String, SourceError> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            // Another task is refreshing; give it a moment before fetching ourselves.
            tokio::time::sleep(Duration::from_millis(100)).await;
            if let Some(crumb) = self.cached_crumb() {
                return Ok(crumb);
            }
        }

        let result = self.fetch_crumb(http_client).await;
        self.refreshing.store(false, Ordering::SeqCst);

        let crumb = result?;
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((crumb.clone(), Instant::now()));
        Ok(crumb)
    }

    async fn fetch_crumb(&self, http_client: &Arc<dyn HttpClient>) -> Result<String, SourceError> {
        let cookie_request = HttpRequest::get("https://fc.yahoo.com").with_header("referer", REFERER);
        http_client.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        for endpoint in CRUMB_ENDPOINTS {
            let crumb_request = HttpRequest::get(endpoint).with_header("referer", REFERER);
            let response = match http_client.execute(crumb_request).await {
                Ok(response) if response.is_success() => response,
                _ => continue,
            };

            let body = response.body.trim();
            if body.contains("<html") || body.contains("<!DOCTYPE") {
                continue;
            }
            if body.to_ascii_lowercase().contains("too many requests") {
                return Err(SourceError::unavailable(
                    "Yahoo rate limited while fetching crumb",
                ));
            }
            if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                debug!(endpoint, "obtained yahoo crumb");
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch Yahoo crumb from all endpoints",
        ))
    }

    /// Drop the cached crumb so the next call fetches a new one.
    pub fn invalidate(&self) {
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Cookie override from `YAHOO_COOKIE`, if set.
    pub fn env_cookie() -> Option<HttpAuth> {
        std::env::var("YAHOO_COOKIE").ok().map(HttpAuth::Cookie)
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance daily close history, with a deterministic offline mode.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    use_real_api: bool,
    auth_manager: Arc<YahooAuthManager>,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(NoopHttpClient), HttpAuth::None)
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            auth,
            use_real_api,
            auth_manager: Arc::new(YahooAuthManager::default()),
        }
    }

    /// Adapter backed by reqwest, honoring a `YAHOO_COOKIE` override.
    pub fn live() -> Self {
        Self::with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            YahooAuthManager::env_cookie().unwrap_or(HttpAuth::None),
        )
    }

    pub fn is_mock(&self) -> bool {
        !self.use_real_api
    }

    async fn fetch_real_history(&self, req: &HistoryRequest) -> Result<PriceHistory, SourceError> {
        let crumb = self.auth_manager.get_crumb(&self.http_client).await?;
        let response = self.get_chart(req, &crumb).await?;

        // Stale crumb: refresh once and retry.
        let response = if response.status == 401 || response.status == 429 {
            self.auth_manager.invalidate();
            let crumb = self.auth_manager.get_crumb(&self.http_client).await?;
            self.get_chart(req, &crumb).await?
        } else {
            response
        };

        match response.status {
            404 => Err(SourceError::not_found(format!(
                "yahoo has no chart for {}",
                req.symbol
            ))),
            status if !(200..300).contains(&status) => Err(SourceError::unavailable(format!(
                "yahoo returned status {status}"
            ))),
            _ => parse_chart(&req.symbol, &response.body),
        }
    }

    async fn get_chart(
        &self,
        req: &HistoryRequest,
        crumb: &str,
    ) -> Result<HttpResponse, SourceError> {
        let request = HttpRequest::get(chart_url(req, crumb))
            .with_header("referer", REFERER)
            .with_auth(&self.auth);
        self.http_client
            .execute(request)
            .await
            .map_err(transport_error)
    }
}

impl HistorySource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                symbol = %req.symbol,
                start = %req.start,
                end = %req.end,
                mock = self.is_mock(),
                "fetching yahoo history"
            );

            if self.use_real_api {
                self.fetch_real_history(&req).await
            } else {
                fake_history(&req)
            }
        })
    }
}

fn chart_url(req: &HistoryRequest, crumb: &str) -> String {
    let period1 = req.start.midnight().assume_utc().unix_timestamp();
    // period2 is exclusive upstream; extend by a day so `end` is included.
    let period2 = req
        .end
        .next_day()
        .unwrap_or(req.end)
        .midnight()
        .assume_utc()
        .unix_timestamp();

    format!(
        "{CHART_ENDPOINT}/{}?period1={period1}&period2={period2}&interval=1d&events=history&crumb={}",
        urlencoding::encode(req.symbol.as_str()),
        urlencoding::encode(crumb)
    )
}

fn transport_error(error: HttpError) -> SourceError {
    if error.is_timeout() {
        SourceError::timeout(format!("yahoo request timed out: {}", error.message()))
    } else {
        SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
    }
}

// ============================================================================
// Chart payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(rename = "instrumentType")]
    instrument_type: Option<String>,
    #[serde(rename = "gmtoffset", default)]
    gmt_offset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn incomplete_meta(symbol: &Symbol, field: &str) -> SourceError {
    SourceError::unavailable(format!(
        "yahoo returned incomplete chart metadata for {symbol}: {field} missing"
    ))
}

/// Turn a v8 chart response into a normalized [`PriceHistory`].
pub(crate) fn parse_chart(symbol: &Symbol, body: &str) -> Result<PriceHistory, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = envelope.chart.error {
        return Err(if error.code.eq_ignore_ascii_case("not found") {
            SourceError::not_found(format!("{symbol}: {}", error.description))
        } else {
            SourceError::unavailable(format!(
                "yahoo chart API error {}: {}",
                error.code, error.description
            ))
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("no chart data for {symbol}")))?;

    let currency = result.meta.currency.ok_or_else(|| incomplete_meta(symbol, "currency"))?;
    let instrument_type = result
        .meta
        .instrument_type
        .ok_or_else(|| incomplete_meta(symbol, "instrument type"))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    // Keyed by exchange-local date; a later sample for the same date replaces the earlier one.
    let mut by_date = BTreeMap::new();
    for (index, timestamp) in result.timestamp.iter().enumerate() {
        let date = OffsetDateTime::from_unix_timestamp(timestamp + result.meta.gmt_offset)
            .map_err(|e| SourceError::internal(format!("invalid timestamp {timestamp}: {e}")))?
            .date();
        let close = closes.get(index).copied().flatten();
        let close = match close {
            Some(value) if value.is_finite() && value > 0.0 => Some(value),
            Some(value) => {
                warn!(%symbol, %date, value, "discarding unusable close");
                None
            }
            None => None,
        };
        by_date.insert(date, close);
    }

    let observations = by_date
        .into_iter()
        .map(|(date, price)| Observation::new(date, price))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| series_error(symbol, e))?;
    let series = PriceSeries::new(observations).map_err(|e| series_error(symbol, e))?;

    Ok(PriceHistory {
        symbol: symbol.clone(),
        currency,
        instrument_type,
        series,
    })
}

fn series_error(symbol: &Symbol, error: ValidationError) -> SourceError {
    match error {
        ValidationError::EmptySeries | ValidationError::SeriesWithoutPrice => {
            SourceError::not_found(format!("no priced history for {symbol}"))
        }
        other => SourceError::internal(format!("invalid history for {symbol}: {other}")),
    }
}

// ============================================================================
// Offline data
// ============================================================================

/// Deterministic weekday closes for offline use.
///
/// The most recent weekday is left unpriced to mimic a provider that has not
/// yet reported the latest close.
fn fake_history(req: &HistoryRequest) -> Result<PriceHistory, SourceError> {
    let seed = symbol_seed(&req.symbol);
    let base = 20.0 + (seed % 400) as f64 / 4.0;

    let mut observations = Vec::new();
    let mut day = req.start;
    loop {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let wobble = ((seed.wrapping_add(day.to_julian_day() as u64)) % 97) as f64 / 10.0;
            let trend = (day - req.start).whole_days() as f64 * 0.01;
            observations.push((day, Some(base + wobble + trend)));
        }
        match day.next_day() {
            Some(next) if next <= req.end => day = next,
            _ => break,
        }
    }

    if observations.len() > 1 {
        if let Some(last) = observations.last_mut() {
            last.1 = None;
        }
    }

    let observations = observations
        .into_iter()
        .map(|(date, price)| Observation::new(date, price))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| series_error(&req.symbol, e))?;
    let series = PriceSeries::new(observations).map_err(|e| series_error(&req.symbol, e))?;

    Ok(PriceHistory {
        symbol: req.symbol.clone(),
        currency: String::from("USD"),
        instrument_type: fake_instrument_type(&req.symbol).to_owned(),
        series,
    })
}

fn fake_instrument_type(symbol: &Symbol) -> &'static str {
    let text = symbol.as_str();
    if text.len() == 5 && text.ends_with('X') {
        "MUTUALFUND"
    } else {
        "EQUITY"
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use time::macros::date;

    /// Serves canned responses keyed by URL fragment and records every request.
    struct ScriptedHttpClient {
        routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>) -> Self {
            Self {
                routes,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self
                .routes
                .iter()
                .find(|(fragment, _)| request.url.contains(fragment))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")));
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { response })
        }
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "instrumentType": "MUTUALFUND", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704250800, 1704292200],
                "indicators": {"quote": [{"close": [100.0, 101.0, null]}]}
            }],
            "error": null
        }
    }"#;

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("valid symbol")
    }

    fn request(value: &str) -> HistoryRequest {
        HistoryRequest::new(symbol(value), date!(2024 - 01 - 01), date!(2024 - 01 - 12))
            .expect("valid request")
    }

    #[test]
    fn chart_dates_use_exchange_offset_and_keep_latest_duplicate() {
        let history = parse_chart(&symbol("FXAIX"), CHART_BODY).expect("history");

        assert_eq!(history.currency, "USD");
        assert_eq!(history.instrument_type, "MUTUALFUND");
        let observations = history.series.observations();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].date, date!(2024 - 01 - 02));
        assert_eq!(observations[0].price, Some(101.0));
        assert_eq!(observations[1].date, date!(2024 - 01 - 03));
        assert_eq!(observations[1].price, None);
    }

    #[test]
    fn chart_not_found_error_maps_to_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(&symbol("NOPE"), body).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::NotFound);
    }

    #[test]
    fn chart_meta_without_currency_is_transient() {
        let body = r#"{"chart":{"result":[{"meta":{"instrumentType":"MUTUALFUND"},"timestamp":[1704205800],"indicators":{"quote":[{"close":[10.0]}]}}],"error":null}}"#;
        let err = parse_chart(&symbol("FXAIX"), body).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Unavailable);
        assert!(err.retryable());
        assert_eq!(
            err.message(),
            "yahoo returned incomplete chart metadata for FXAIX: currency missing"
        );
    }

    #[test]
    fn chart_without_prices_is_not_found() {
        let body = r#"{"chart":{"result":[{"meta":{"currency":"USD","instrumentType":"EQUITY"},"timestamp":[1704205800],"indicators":{"quote":[{"close":[null]}]}}],"error":null}}"#;
        let err = parse_chart(&symbol("F"), body).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn mock_history_is_deterministic_weekdays_with_unreported_tail() {
        let adapter = YahooAdapter::default();
        assert!(adapter.is_mock());

        let first = adapter.history(request("FXAIX")).await.expect("history");
        let second = adapter.history(request("FXAIX")).await.expect("history");
        assert_eq!(first, second);

        let observations = first.series.observations();
        // 2024-01-01..=2024-01-12 has ten weekdays.
        assert_eq!(observations.len(), 10);
        assert!(observations
            .iter()
            .all(|o| !matches!(o.date.weekday(), Weekday::Saturday | Weekday::Sunday)));
        assert_eq!(observations[9].date, date!(2024 - 01 - 12));
        assert_eq!(observations[9].price, None);
        assert!(observations[..9].iter().all(|o| o.price.is_some()));
        assert_eq!(first.instrument_type, "MUTUALFUND");
    }

    #[tokio::test]
    async fn mock_history_over_weekend_only_is_not_found() {
        let adapter = YahooAdapter::default();
        let req = HistoryRequest::new(symbol("F"), date!(2024 - 01 - 06), date!(2024 - 01 - 07))
            .expect("valid request");
        let err = adapter.history(req).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn real_history_sends_crumb_and_period_bounds() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("fc.yahoo.com", Ok(HttpResponse::with_status(404, ""))),
            ("getcrumb", Ok(HttpResponse::ok_json("abc123"))),
            ("/v8/finance/chart/FXAIX", Ok(HttpResponse::ok_json(CHART_BODY))),
        ]));
        let adapter = YahooAdapter::with_http_client(client.clone(), HttpAuth::None);
        assert!(!adapter.is_mock());

        let history = adapter.history(request("FXAIX")).await.expect("history");
        assert_eq!(history.series.len(), 2);

        let urls = client.recorded_urls();
        let chart_url = urls
            .iter()
            .find(|url| url.contains("/v8/finance/chart/"))
            .expect("chart request");
        assert!(chart_url.contains("period1=1704067200"));
        assert!(chart_url.contains("period2=1705104000"));
        assert!(chart_url.contains("interval=1d"));
        assert!(chart_url.contains("crumb=abc123"));
    }

    #[tokio::test]
    async fn real_history_maps_404_to_not_found() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("getcrumb", Ok(HttpResponse::ok_json("abc123"))),
            ("fc.yahoo.com", Ok(HttpResponse::ok_json(""))),
        ]));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let err = adapter.history(request("NOPE")).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn transport_timeout_is_retryable_timeout() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("fc.yahoo.com", Ok(HttpResponse::ok_json(""))),
            ("getcrumb", Ok(HttpResponse::ok_json("abc123"))),
            ("/v8/finance/chart/", Err(HttpError::timed_out("deadline elapsed"))),
        ]));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let err = adapter.history(request("FXAIX")).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Timeout);
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn html_crumb_pages_are_skipped() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("fc.yahoo.com", Ok(HttpResponse::ok_json(""))),
            ("getcrumb", Ok(HttpResponse::ok_json("<html>consent</html>"))),
        ]));
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let err = adapter.history(request("FXAIX")).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Unavailable);
    }
}
