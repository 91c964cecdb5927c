//! Example: Write a short cardiac-phase sequence and read it back
//!
//! Run with: cargo run --example cardiac_phases

use ndarray::Array4;
use volseq::{
    CodecOptions, CodecRegistry, CompressionLevel, FileSystemArrayStore, Frame, FrameGeometry,
    IndexAxis, IndexLabel, Sequence,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("volseq Example: Cardiac Phases");
    println!("==============================\n");

    // Eight 32x32x16 phases sharing one axis-aligned geometry
    let geometry = FrameGeometry::with_spacing([-40.0, -40.0, 10.0], [2.5, 2.5, 5.0]);
    let mut sequence = Sequence::new(IndexAxis::new("trigger time", "ms"));
    for phase in 0..8 {
        let voxels = Array4::from_shape_fn([16, 32, 32, 1], |(k, j, i, _)| {
            ((i + j + k) as i16 * 10 + phase as i16) % 1024
        });
        sequence.push_frame(
            IndexLabel::Numeric(phase as f64 * 112.5),
            Frame::scalar(geometry, voxels.into()),
        );
    }
    println!("Built {} phases ({:?} index)", sequence.len(), sequence.index_type());

    let options = CodecOptions::default().with_compression_level(CompressionLevel::best());
    let registry = CodecRegistry::with_defaults(options);

    let temp_dir = tempfile::tempdir()?;
    let store = FileSystemArrayStore::new(temp_dir.path());
    let path = "heart.seq.nrrd";

    registry.write(&store, path, &sequence).await?;
    let size = std::fs::metadata(temp_dir.path().join(path))?.len();
    println!("Wrote {} ({} bytes, gzip)", path, size);

    let read = registry
        .read(&store, path)
        .await?
        .ok_or("file was not recognized as a volume sequence")?;

    println!("Read back {} phases:", read.len());
    for item in &read.items {
        println!("  {} {}", item.label, read.index_axis.unit);
    }
    println!("Identical to input: {}", read == sequence);

    Ok(())
}
