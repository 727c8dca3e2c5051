//! Classifier adapter: an explicitly owned, lazily initialised handle to an
//! external image-classification model.

pub mod payload;
pub mod remote;
#[cfg(feature = "torch")]
pub mod torch;

use futures::future::BoxFuture;
use shared::{Classification, Prediction};
use tokio::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Model initialization failed: {0}")]
    ModelLoad(String),
    #[error("Inference request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Inference service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),
    #[error("Model returned no predictions")]
    EmptyOutput,
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Model inference error: {0}")]
    Inference(String),
}

/// An initialised model that can score one image.
pub trait ImageModel: Send + Sync {
    fn predict<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>>;
}

/// Performs the (potentially expensive) one-time model initialisation.
pub trait ModelLoader: Send + Sync {
    fn describe(&self) -> String;

    fn load(&self) -> BoxFuture<'_, Result<Box<dyn ImageModel>, ClassifierError>>;
}

pub struct ClassifierAdapter {
    loader: Box<dyn ModelLoader>,
    model: OnceCell<Box<dyn ImageModel>>,
}

impl ClassifierAdapter {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self::from_boxed(Box::new(loader))
    }

    pub fn from_boxed(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Loads the model on first use. A failed load leaves the handle empty so
    /// the next call tries again.
    pub async fn initialize(&self) -> Result<&dyn ImageModel, ClassifierError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                log::info!("Initializing classifier: {}", self.loader.describe());
                let model = self.loader.load().await?;
                log::info!("Classifier ready");
                Ok::<_, ClassifierError>(model)
            })
            .await?;
        Ok(model.as_ref())
    }

    pub fn is_initialized(&self) -> bool {
        self.model.initialized()
    }

    /// Returns predictions ranked by score, highest first.
    pub async fn classify(&self, image: &[u8]) -> Result<Classification, ClassifierError> {
        if image.is_empty() {
            return Err(ClassifierError::InvalidImage("image data is empty".into()));
        }

        let model = self.initialize().await?;
        let predictions = model.predict(image).await?;
        check_predictions(&predictions)?;
        Classification::from_predictions(predictions).ok_or(ClassifierError::EmptyOutput)
    }

    /// Drops the loaded model; the next call re-initialises it.
    pub fn dispose(&mut self) {
        if self.model.take().is_some() {
            log::info!("Classifier disposed: {}", self.loader.describe());
        }
    }
}

fn check_predictions(predictions: &[Prediction]) -> Result<(), ClassifierError> {
    if predictions.is_empty() {
        return Err(ClassifierError::EmptyOutput);
    }
    match predictions
        .iter()
        .find(|p| !p.score.is_finite() || !(0.0..=1.0).contains(&p.score))
    {
        Some(bad) => Err(ClassifierError::MalformedOutput(format!(
            "score {} for label '{}' is outside [0, 1]",
            bad.score, bad.label
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted loaders for adapter and route tests.

    use super::*;
    use futures::FutureExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    pub struct Counters {
        pub loads: Arc<AtomicUsize>,
        pub predictions: Arc<AtomicUsize>,
    }

    impl Counters {
        pub fn loads(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }

        pub fn predictions(&self) -> usize {
            self.predictions.load(Ordering::SeqCst)
        }
    }

    #[derive(Clone)]
    pub enum Script {
        Predict(Vec<Prediction>),
        FailLoadOnce(Vec<Prediction>),
        FailPredict,
    }

    pub struct ScriptedLoader {
        pub script: Script,
        pub counters: Counters,
    }

    impl ScriptedLoader {
        pub fn new(script: Script) -> (Self, Counters) {
            let counters = Counters::default();
            (
                Self {
                    script,
                    counters: counters.clone(),
                },
                counters,
            )
        }
    }

    struct ScriptedModel {
        script: Script,
        counters: Counters,
    }

    impl ModelLoader for ScriptedLoader {
        fn describe(&self) -> String {
            "scripted".to_string()
        }

        fn load(&self) -> BoxFuture<'_, Result<Box<dyn ImageModel>, ClassifierError>> {
            async move {
                let attempt = self.counters.loads.fetch_add(1, Ordering::SeqCst);
                if matches!(self.script, Script::FailLoadOnce(_)) && attempt == 0 {
                    return Err(ClassifierError::ModelLoad("network unreachable".into()));
                }
                Ok(Box::new(ScriptedModel {
                    script: self.script.clone(),
                    counters: self.counters.clone(),
                }) as Box<dyn ImageModel>)
            }
            .boxed()
        }
    }

    impl ImageModel for ScriptedModel {
        fn predict<'a>(
            &'a self,
            _image: &'a [u8],
        ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>> {
            async move {
                self.counters.predictions.fetch_add(1, Ordering::SeqCst);
                match &self.script {
                    Script::Predict(predictions) | Script::FailLoadOnce(predictions) => {
                        Ok(predictions.clone())
                    }
                    Script::FailPredict => Err(ClassifierError::Upstream {
                        status: 503,
                        body: "model is loading".into(),
                    }),
                }
            }
            .boxed()
        }
    }
}
