use std::sync::Arc;

use afen_blockchain::{
    ContractError, NATIVE_DECIMALS, NftContract, TransactionHandle, UnitsError, parse_units,
};
use afen_core::{MarketError, UserSession};
use afen_integrations::{AssetFile, CreateNftRequest, MetadataError, MetadataService};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::wallet_session::WalletSession;

pub const SUCCESS_TEXT: &str = "Congratulations, NFT created.";
pub const ERROR_TEXT: &str =
    "An error occurred while trying to create NFT, please try again later";
pub const ART_SAVED_TEXT: &str = "Art Saved";
pub const ORPHANED_TITLE: &str = "Artwork saved, minting failed";

const MAX_ROYALTY_PERCENT: u8 = 100;

// ---------------------------------------------------------------------------
// Form and result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Info,
    Success,
    Error,
}

/// A banner message for the create page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
}

impl SubmissionResult {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Info,
            title: None,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Success,
            title: None,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Error,
            title: None,
            text: text.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }
}

/// What the user entered on the create page.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub title: String,
    pub description: String,
    pub royalty_percent: u8,
    /// Decimal string, sent to the metadata service as entered.
    pub price_in_quote_asset: String,
    /// Decimal string in the chain's native asset.
    pub price_in_native_asset: String,
    pub uploaded_file: Option<AssetFile>,
}

impl SubmissionForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Whether the submit button should be enabled.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// First problem that keeps the form from being submitted.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.title.trim().is_empty() {
            return Err(SubmissionError::InvalidForm("title is required"));
        }
        if self.royalty_percent > MAX_ROYALTY_PERCENT {
            return Err(SubmissionError::InvalidForm("royalty must be at most 100%"));
        }
        if self.price_in_quote_asset.trim().is_empty()
            || self.price_in_native_asset.trim().is_empty()
        {
            return Err(SubmissionError::InvalidForm("both prices are required"));
        }
        if !self.uploaded_file.as_ref().is_some_and(|f| !f.is_empty()) {
            return Err(SubmissionError::MissingFile);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("No wallet connected or profile not loaded")]
    Unauthenticated,

    #[error("Invalid {field} price: {source}")]
    InvalidPrice {
        field: &'static str,
        #[source]
        source: UnitsError,
    },

    #[error("Incomplete form: {0}")]
    InvalidForm(&'static str),

    #[error("No artwork file selected")]
    MissingFile,

    #[error("Upload failed: {0}")]
    Network(#[from] MetadataError),

    #[error("Mint failed for stored artwork {file_hash}: {source}")]
    ContractCall {
        file_hash: String,
        #[source]
        source: ContractError,
    },

    #[error("Wallet returned an empty transaction hash for {file_hash}")]
    EmptyTransactionHash { file_hash: String },
}

impl SubmissionError {
    /// Hash of an uploaded record that never got a token.
    pub fn orphaned_file_hash(&self) -> Option<&str> {
        match self {
            Self::ContractCall { file_hash, .. } | Self::EmptyTransactionHash { file_hash } => {
                Some(file_hash)
            }
            _ => None,
        }
    }
}

impl From<SubmissionError> for MarketError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Unauthenticated => MarketError::Unauthenticated,
            SubmissionError::InvalidForm(_)
            | SubmissionError::InvalidPrice { .. }
            | SubmissionError::MissingFile => {
                MarketError::Internal(err.to_string())
            }
            SubmissionError::Network(e) => e.into(),
            SubmissionError::ContractCall { source, .. } => source.into(),
            SubmissionError::EmptyTransactionHash { .. } => {
                MarketError::ContractCall(err.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Upload then mint
// ---------------------------------------------------------------------------

/// Stores the artwork off-chain, then mints a token referencing it.
pub struct ContractSubmissionFlow {
    metadata: Arc<dyn MetadataService>,
    contract: Arc<dyn NftContract>,
}

impl ContractSubmissionFlow {
    pub fn new(metadata: Arc<dyn MetadataService>, contract: Arc<dyn NftContract>) -> Self {
        Self { metadata, contract }
    }

    /// Run the submission and collapse the outcome into one banner.
    pub async fn submit(&self, form: &SubmissionForm, session: &UserSession) -> SubmissionResult {
        self.submit_with_progress(form, session, &|_| {}).await
    }

    /// Like [`submit`](Self::submit), publishing interim banners to `progress`.
    pub async fn submit_with_progress(
        &self,
        form: &SubmissionForm,
        session: &UserSession,
        progress: &(dyn Fn(SubmissionResult) + Send + Sync),
    ) -> SubmissionResult {
        match self.try_submit(form, session, progress).await {
            Ok(tx) => {
                info!(tx = %tx.hash, "nft minted");
                SubmissionResult::success(SUCCESS_TEXT)
            }
            Err(e) => match e.orphaned_file_hash() {
                Some(file_hash) => {
                    error!(%file_hash, "artwork stored but mint failed: {e}");
                    SubmissionResult::error(ERROR_TEXT).with_title(ORPHANED_TITLE)
                }
                None => {
                    warn!("nft submission failed: {e}");
                    SubmissionResult::error(ERROR_TEXT)
                }
            },
        }
    }

    pub async fn try_submit(
        &self,
        form: &SubmissionForm,
        session: &UserSession,
        progress: &(dyn Fn(SubmissionResult) + Send + Sync),
    ) -> Result<TransactionHandle, SubmissionError> {
        if !session.is_connected() {
            return Err(SubmissionError::Unauthenticated);
        }
        let user_id = session.user_id().ok_or(SubmissionError::Unauthenticated)?;
        form.validate()?;
        let file = form
            .uploaded_file
            .clone()
            .ok_or(SubmissionError::MissingFile)?;

        let quote_units = parse_units(&form.price_in_quote_asset, NATIVE_DECIMALS).map_err(
            |source| SubmissionError::InvalidPrice {
                field: "quote",
                source,
            },
        )?;
        let native_units = parse_units(&form.price_in_native_asset, NATIVE_DECIMALS).map_err(
            |source| SubmissionError::InvalidPrice {
                field: "native",
                source,
            },
        )?;

        let created = self
            .metadata
            .create_nft(CreateNftRequest {
                file,
                title: form.title.clone(),
                royalty: form.royalty_percent,
                description: form.description.clone(),
                price: form.price_in_quote_asset.clone(),
                user_id: user_id.to_string(),
            })
            .await?;
        if created.file_hash.is_empty() {
            return Err(MetadataError::MissingFileHash.into());
        }
        info!(file_hash = %created.file_hash, "artwork stored");
        progress(SubmissionResult::success(ART_SAVED_TEXT));

        let file_hash = created.file_hash;
        let tx = self
            .contract
            .create_nft(&file_hash, quote_units, native_units)
            .await
            .map_err(|source| SubmissionError::ContractCall {
                file_hash: file_hash.clone(),
                source,
            })?;
        if tx.hash.is_empty() {
            return Err(SubmissionError::EmptyTransactionHash { file_hash });
        }
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Create page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateView {
    ConnectWallet,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(SubmissionResult),
    /// A submission is already in flight; nothing was sent.
    Busy,
    NotConnected,
}

/// Holds the loading flag for the lifetime of one submission.
struct LoadingGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a watch::Sender<bool>) -> Option<Self> {
        let acquired = flag.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        acquired.then_some(Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

/// The "create NFT" page.
pub struct CreatePage {
    session: WalletSession,
    metadata: Arc<dyn MetadataService>,
    loading: watch::Sender<bool>,
    message: watch::Sender<Option<SubmissionResult>>,
}

impl CreatePage {
    pub fn new(session: WalletSession, metadata: Arc<dyn MetadataService>) -> Self {
        let (loading, _) = watch::channel(false);
        let (message, _) = watch::channel(None);
        Self {
            session,
            metadata,
            loading,
            message,
        }
    }

    pub fn view(&self) -> CreateView {
        if self.session.is_connected() {
            CreateView::Form
        } else {
            CreateView::ConnectWallet
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn message(&self) -> Option<SubmissionResult> {
        self.message.borrow().clone()
    }

    pub fn dismiss_message(&self) {
        self.message.send_replace(None);
    }

    pub fn loading_rx(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn message_rx(&self) -> watch::Receiver<Option<SubmissionResult>> {
        self.message.subscribe()
    }

    /// Submit handler. At most one submission runs at a time.
    pub async fn create_nft(&self, form: &SubmissionForm) -> SubmitOutcome {
        let Some(contract) = self.session.signed_contract() else {
            return SubmitOutcome::NotConnected;
        };
        let Some(_guard) = LoadingGuard::acquire(&self.loading) else {
            warn!("submission already in progress");
            return SubmitOutcome::Busy;
        };
        self.message.send_replace(None);

        let session = self.session.snapshot();
        let flow = ContractSubmissionFlow::new(self.metadata.clone(), contract);
        let publish = |banner: SubmissionResult| {
            self.message.send_replace(Some(banner));
        };
        let result = flow.submit_with_progress(form, &session, &publish).await;
        self.message.send_replace(Some(result.clone()));
        SubmitOutcome::Completed(result)
    }
}
