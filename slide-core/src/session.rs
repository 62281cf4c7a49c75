//! Editor sessions and cancellation of in-flight external calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{EditingSurface, SceneDocument, SurfaceConfig};

/// A cheap, cloneable cancellation flag.
///
/// Every external-service call started on behalf of a session carries a
/// clone of the session's token. Once the token is cancelled, results that
/// arrive are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Pass `value` through unless the token has been cancelled.
    #[must_use]
    pub fn accept<T>(&self, value: T) -> Option<T> {
        if self.is_cancelled() {
            None
        } else {
            Some(value)
        }
    }
}

/// The editor session: at most one open document plus the token that
/// guards external calls made on its behalf.
#[derive(Debug)]
pub struct EditorSession {
    config: SurfaceConfig,
    surface: Option<EditingSurface>,
    token: CancellationToken,
}

impl EditorSession {
    /// Create a session with no open document.
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config,
            surface: None,
            token: CancellationToken::new(),
        }
    }

    /// Start a new long-running action, superseding any in flight.
    ///
    /// The returned token must be presented to [`deliver`](Self::deliver)
    /// with the action's result.
    pub fn begin(&mut self) -> CancellationToken {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.token.clone()
    }

    /// Open the result of an action started with [`begin`](Self::begin).
    ///
    /// Returns `false` and discards `document` if the action was superseded
    /// or the session was closed in the meantime.
    pub fn deliver(&mut self, token: &CancellationToken, document: SceneDocument) -> bool {
        match token.accept(document) {
            Some(document) => {
                self.surface = Some(EditingSurface::with_config(document, self.config));
                true
            }
            None => {
                tracing::info!("Discarding result of a cancelled action");
                false
            }
        }
    }

    /// Open a document directly, cancelling any action in flight.
    pub fn open(&mut self, document: SceneDocument) {
        let token = self.begin();
        self.deliver(&token, document);
    }

    /// Close the editor, cancelling any action in flight.
    ///
    /// Returns the present document of the closed editor.
    pub fn close(&mut self) -> Option<SceneDocument> {
        self.token.cancel();
        self.surface.take().map(EditingSurface::into_document)
    }

    /// Whether a document is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// The open editing surface.
    #[must_use]
    pub fn surface(&self) -> Option<&EditingSurface> {
        self.surface.as_ref()
    }

    /// The open editing surface, mutably.
    pub fn surface_mut(&mut self) -> Option<&mut EditingSurface> {
        self.surface.as_mut()
    }

    /// Token guarding the current action.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}
