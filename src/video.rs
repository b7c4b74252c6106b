// src/video.rs - Camera capture with horizontal mirroring
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use tracing::{debug, info, warn};

use crate::config::CameraConfig;
use crate::error::{Error, Result};

/// Camera details worth logging at startup.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub name: String,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

/// Frame source backed by a local camera.
pub struct VideoSource {
    camera: Camera,
    mirror: bool,
}

impl VideoSource {
    pub fn new_camera(config: &CameraConfig) -> Result<Self> {
        debug!("Attempting to open camera index {}", config.index);

        let format = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(CameraIndex::Index(config.index), requested)
            .map_err(|e| Error::Camera(format!("failed to open camera {}: {}", config.index, e)))?;

        camera
            .open_stream()
            .map_err(|e| Error::Camera(format!("failed to open camera stream: {}", e)))?;

        let source = Self {
            camera,
            mirror: config.mirror,
        };
        let info = source.info();
        info!(
            "Camera '{}' streaming {}x{} @ {} fps",
            info.name, info.width, info.height, info.fps
        );
        Ok(source)
    }

    /// Capture and decode one frame, mirrored if configured.
    ///
    /// The landmark helper sees the mirrored image, so handedness labels
    /// follow the mirrored picture.
    pub fn read_frame(&mut self) -> Result<RgbImage> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| Error::Camera(format!("failed to capture frame: {}", e)))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::Camera(format!("failed to decode frame: {}", e)))?;

        if self.mirror {
            Ok(image::imageops::flip_horizontal(&decoded))
        } else {
            Ok(decoded)
        }
    }

    pub fn info(&self) -> VideoInfo {
        let resolution = self.camera.resolution();
        VideoInfo {
            name: self.camera.info().human_name(),
            fps: self.camera.frame_rate(),
            width: resolution.width(),
            height: resolution.height(),
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            warn!("Failed to stop camera stream: {}", e);
        }
    }
}

/// Names of the cameras the platform backend can see.
pub fn list_cameras() -> Result<Vec<String>> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| Error::Camera(format!("failed to query cameras: {}", e)))?;
    Ok(cameras.iter().map(|c| c.human_name()).collect())
}
