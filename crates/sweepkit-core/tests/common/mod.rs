use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use sweepkit_core::{ApiError, Page, RegionalClientFactory, ResourceAdapter, Scope};

/// Ordered record of every remote call made by fake adapters.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    #[allow(dead_code)]
    pub fn last_position(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().rposition(|e| e.starts_with(prefix))
    }
}

/// Client handed out by [`FakeFactory`].
#[derive(Debug)]
pub struct FakeClient {
    #[allow(dead_code)]
    pub region: String,
}

#[derive(Clone)]
enum Listing {
    Items(Vec<String>),
    Error(ApiError),
    Hang,
}

/// Adapter with scripted list pages and delete results.
///
/// Page `n` is requested with token `page-n`; every page but the last gets a
/// continuation token pointing at the next one.
pub struct FakeAdapter {
    name: String,
    log: CallLog,
    pages: Vec<Listing>,
    endless: bool,
    delete_errors: HashMap<String, ApiError>,
}

impl FakeAdapter {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            pages: Vec::new(),
            endless: false,
            delete_errors: HashMap::new(),
        }
    }

    pub fn page(mut self, items: &[&str]) -> Self {
        self.pages
            .push(Listing::Items(items.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn failing_page(mut self, code: &str) -> Self {
        self.pages
            .push(Listing::Error(ApiError::coded(code, "scripted failure")));
        self
    }

    /// A page whose list call never returns.
    #[allow(dead_code)]
    pub fn hanging_page(mut self) -> Self {
        self.pages.push(Listing::Hang);
        self
    }

    /// Always hand out another continuation token.
    #[allow(dead_code)]
    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn delete_fails(mut self, identifier: &str, code: &str) -> Self {
        self.delete_errors.insert(
            identifier.to_string(),
            ApiError::coded(code, "scripted failure"),
        );
        self
    }
}

#[async_trait]
impl ResourceAdapter<FakeClient> for FakeAdapter {
    async fn list(
        &self,
        _client: &FakeClient,
        _scope: &Scope,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page> {
        let index = match page_token {
            None => 0,
            Some(token) => token.trim_start_matches("page-").parse::<usize>()?,
        };
        self.log.push(format!("list {} {}", self.name, index));

        if self.endless {
            return Ok(Page::more([format!("{}-{index}", self.name)], format!("page-{}", index + 1)));
        }

        match self.pages.get(index) {
            Some(Listing::Error(err)) => Err(err.clone().into()),
            Some(Listing::Hang) => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Ok(Page::default())
            }
            Some(Listing::Items(items)) if index + 1 < self.pages.len() => {
                Ok(Page::more(items.clone(), format!("page-{}", index + 1)))
            }
            Some(Listing::Items(items)) => Ok(Page::last(items.clone())),
            None => Ok(Page::default()),
        }
    }

    async fn delete(
        &self,
        _client: &FakeClient,
        _scope: &Scope,
        identifier: &str,
    ) -> anyhow::Result<()> {
        self.log.push(format!("delete {} {}", self.name, identifier));
        match self.delete_errors.get(identifier) {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }
}

/// Factory that fails for the scopes it is told to.
#[derive(Default)]
pub struct FakeFactory {
    failing: Vec<String>,
}

impl FakeFactory {
    #[allow(dead_code)]
    pub fn failing_for(scope: &str) -> Self {
        Self {
            failing: vec![scope.to_string()],
        }
    }
}

#[async_trait]
impl RegionalClientFactory<FakeClient> for FakeFactory {
    async fn client(&self, scope: &Scope) -> anyhow::Result<FakeClient> {
        if self.failing.iter().any(|s| s == scope.as_str()) {
            anyhow::bail!("no credentials for {scope}");
        }
        Ok(FakeClient {
            region: scope.to_string(),
        })
    }
}
