use gesture_control::config::AppConfig;
use gesture_control::video::{list_cameras, VideoSource};

fn main() {
    tracing_subscriber::fmt::init();
    println!("Testing camera access...\n");

    match list_cameras() {
        Ok(cameras) => {
            println!("Found {} camera(s):", cameras.len());
            for (i, name) in cameras.iter().enumerate() {
                println!("  [{}] {}", i, name);
            }
        }
        Err(e) => println!("✗ Failed to query cameras: {}", e),
    }

    let config = match AppConfig::load_or_default(None) {
        Ok(config) => config,
        Err(e) => {
            println!("✗ Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };

    match VideoSource::new_camera(&config.camera) {
        Ok(mut source) => {
            let info = source.info();
            println!("✓ Camera '{}' opened at {}x{} @ {} fps", info.name, info.width, info.height, info.fps);

            match source.read_frame() {
                Ok(frame) => println!(
                    "✓ Frame captured successfully ({}x{}, mirrored: {})",
                    frame.width(),
                    frame.height(),
                    config.camera.mirror
                ),
                Err(e) => println!("✗ Failed to capture frame: {}", e),
            }
        }
        Err(e) => {
            println!("✗ Failed to open camera {}: {}", config.camera.index, e);
            println!("\nPossible causes:");
            println!("1. Camera is being used by another app");
            println!("2. Camera permissions not granted");
            println!("3. No camera connected");
        }
    }
}
