// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::time::Duration;

use backon::BackoffBuilder;
use backon::ExponentialBuilder;
use bytes::Bytes;
use http::Request;
use http::Response;
use http::StatusCode;
use log::warn;

use super::HttpFetch;
use crate::Result;

/// Add retry for temporary failed requests.
///
/// `RetryFetcher` wraps any [`HttpFetch`] and resends the request when the
/// transport reports a temporary failure ([`Error::is_temporary`]) or the
/// response carries a retryable status code (429, 500, 502, 503, 504 by
/// default). Delays between attempts follow [`backon::ExponentialBuilder`].
///
/// If the request still fails after all attempts, the error is set to
/// persistent so outer code does not retry it again.
///
/// [`Error::is_temporary`]: crate::Error::is_temporary
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use swiftfs::raw::HttpClient;
/// use swiftfs::raw::RetryFetcher;
///
/// let client = HttpClient::with(
///     RetryFetcher::new(reqwest::Client::new())
///         .with_max_times(4)
///         .with_min_delay(Duration::from_millis(100))
///         .with_jitter(),
/// );
/// # let _ = client;
/// ```
#[derive(Clone)]
pub struct RetryFetcher<F> {
    inner: F,
    builder: ExponentialBuilder,
    retry_statuses: Vec<StatusCode>,
}

impl<F> RetryFetcher<F> {
    /// Wrap the given fetcher with the default retry policy.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            builder: ExponentialBuilder::default(),
            retry_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }

    /// Set jitter of current backoff.
    ///
    /// If jitter is enabled, the backoff will add a random jitter in
    /// `[0, min_delay)` to the current delay.
    pub fn with_jitter(mut self) -> Self {
        self.builder = self.builder.with_jitter();
        self
    }

    /// Set factor of current backoff.
    ///
    /// # Panics
    ///
    /// This function will panic if input factor smaller than `1.0`.
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.builder = self.builder.with_factor(factor);
        self
    }

    /// Set min_delay of current backoff.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.builder = self.builder.with_min_delay(min_delay);
        self
    }

    /// Set max_delay of current backoff.
    ///
    /// Delay will not increasing if current delay is larger than max_delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.builder = self.builder.with_max_delay(max_delay);
        self
    }

    /// Set max_times of current backoff.
    ///
    /// The request is sent at most `max_times + 1` times.
    pub fn with_max_times(mut self, max_times: usize) -> Self {
        self.builder = self.builder.with_max_times(max_times);
        self
    }

    /// Replace the set of response status codes that trigger a retry.
    pub fn with_retry_statuses(mut self, statuses: impl Into<Vec<StatusCode>>) -> Self {
        self.retry_statuses = statuses.into();
        self
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }
}

/// Requests are buffered, so rebuilding one for the next attempt only clones
/// cheap parts.
fn clone_request(req: &Request<Bytes>) -> Request<Bytes> {
    let mut new = Request::builder()
        .method(req.method().clone())
        .uri(req.uri().clone())
        .version(req.version())
        .body(req.body().clone())
        .expect("cloning a valid request must succeed");
    new.headers_mut().extend(
        req.headers()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    new
}

impl<F: HttpFetch> HttpFetch for RetryFetcher<F> {
    async fn fetch(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let uri = req.uri().clone();
        let mut backoff = self.builder.build();

        loop {
            let attempt = clone_request(&req);
            match self.inner.fetch(attempt).await {
                Ok(resp) if self.should_retry_status(resp.status()) => match backoff.next() {
                    None => return Ok(resp),
                    Some(dur) => {
                        warn!(
                            target: "swiftfs::http",
                            "url={} status={} -> retry after {}s",
                            uri, resp.status(), dur.as_secs_f64());
                        tokio::time::sleep(dur).await;
                        continue;
                    }
                },
                Ok(resp) => return Ok(resp),
                Err(err) if !err.is_temporary() => return Err(err),
                Err(err) => match backoff.next() {
                    None => return Err(err.set_persistent()),
                    Some(dur) => {
                        warn!(
                            target: "swiftfs::http",
                            "url={} -> retry after {}s: error={:?}",
                            uri, dur.as_secs_f64(), err);
                        tokio::time::sleep(dur).await;
                        continue;
                    }
                },
            }
        }
    }
}
