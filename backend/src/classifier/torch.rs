use std::sync::{Arc, Mutex};

use actix_web::web;
use futures::FutureExt;
use futures::future::BoxFuture;
use image::imageops::FilterType;
use shared::Prediction;
use tch::nn::ModuleT;
use tch::{CModule, Device, Kind, Tensor};

use super::{ClassifierError, ImageModel, ModelLoader};
use crate::config::TorchConfig;

const INPUT_SIZE: u32 = 224;
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// TorchScript classifier loaded from disk, one label per line in `labels_path`.
pub struct TorchModelLoader {
    model_path: String,
    labels_path: String,
}

impl TorchModelLoader {
    pub fn from_config(config: &TorchConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            labels_path: config.labels_path.clone(),
        }
    }
}

impl ModelLoader for TorchModelLoader {
    fn describe(&self) -> String {
        format!("TorchScript model {}", self.model_path)
    }

    fn load(&self) -> BoxFuture<'_, Result<Box<dyn ImageModel>, ClassifierError>> {
        let model_path = self.model_path.clone();
        let labels_path = self.labels_path.clone();
        async move {
            let labels = std::fs::read_to_string(&labels_path).map_err(|e| {
                ClassifierError::ModelLoad(format!("reading {}: {}", labels_path, e))
            })?;
            let labels: Vec<String> = labels
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            if labels.is_empty() {
                return Err(ClassifierError::ModelLoad(format!(
                    "{} contains no labels",
                    labels_path
                )));
            }

            let device = Device::cuda_if_available();
            let module = web::block(move || CModule::load_on_device(&model_path, device))
                .await
                .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
                .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;
            log::info!("Loaded TorchScript model on {:?} with {} labels", device, labels.len());

            Ok(Box::new(TorchModel {
                module: Arc::new(Mutex::new(module)),
                labels: Arc::new(labels),
                device,
            }) as Box<dyn ImageModel>)
        }
        .boxed()
    }
}

pub struct TorchModel {
    module: Arc<Mutex<CModule>>,
    labels: Arc<Vec<String>>,
    device: Device,
}

impl ImageModel for TorchModel {
    fn predict<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>> {
        let module = Arc::clone(&self.module);
        let labels = Arc::clone(&self.labels);
        let device = self.device;
        let image = image.to_vec();
        async move {
            web::block(move || run_inference(&module, &labels, device, &image))
                .await
                .map_err(|e| ClassifierError::Inference(e.to_string()))?
        }
        .boxed()
    }
}

fn run_inference(
    module: &Mutex<CModule>,
    labels: &[String],
    device: Device,
    image: &[u8],
) -> Result<Vec<Prediction>, ClassifierError> {
    let input = preprocess(image)?.to_device(device);
    let output = {
        let module = module
            .lock()
            .map_err(|_| ClassifierError::Inference("model lock poisoned".into()))?;
        module.forward_t(&input, false)
    };

    let probabilities: Vec<f32> = output
        .softmax(-1, Kind::Float)
        .view([-1])
        .to_device(Device::Cpu)
        .try_into()
        .map_err(|e: tch::TchError| ClassifierError::Inference(e.to_string()))?;

    if probabilities.len() != labels.len() {
        return Err(ClassifierError::MalformedOutput(format!(
            "model produced {} scores for {} labels",
            probabilities.len(),
            labels.len()
        )));
    }

    Ok(labels
        .iter()
        .zip(probabilities)
        .map(|(label, score)| Prediction::new(label.clone(), score))
        .collect())
}

/// Resizes to 224x224 and normalises with ImageNet statistics, CHW order.
fn preprocess(image: &[u8]) -> Result<Tensor, ClassifierError> {
    let decoded = image::load_from_memory(image)
        .map_err(|e| ClassifierError::InvalidImage(e.to_string()))?
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8();

    let plane = (INPUT_SIZE * INPUT_SIZE) as usize;
    let mut data = vec![0f32; 3 * plane];
    for (i, pixel) in decoded.pixels().enumerate() {
        for c in 0..3 {
            data[c * plane + i] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    Ok(Tensor::from_slice(&data).view([1, 3, INPUT_SIZE as i64, INPUT_SIZE as i64]))
}
