//! Example: Building, listing and extracting a PAK archive
//!
//! Run with: `cargo run --example round_trip`

use pakfile_core::NoopProgress;
use pakfile_core::PakConfig;
use pakfile_core::create;
use pakfile_core::extract;
use pakfile_core::extraction::ConflictDecision;
use pakfile_core::extraction::ReaderPrompt;
use pakfile_core::list;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let work = std::env::temp_dir().join("pakfile-round-trip");
    let source = work.join("src");
    std::fs::create_dir_all(source.join("maps"))?;
    std::fs::write(source.join("maps/E1M1.bsp"), "level data")?;
    std::fs::write(source.join("progs.dat"), "compiled qc")?;

    // Example 1: create with lower-cased entry paths
    println!("Example 1: Create");
    let archive = work.join("pak0.pak");
    let _ = std::fs::remove_file(&archive);
    let report = create(&source, &archive, &PakConfig::default().with_case_fold(true))?;
    println!(
        "  Added {} files, {} bytes on disk",
        report.files_added(),
        report.archive_size
    );

    // Example 2: list only the maps
    println!("\nExample 2: List");
    for entry in list(&archive, &PakConfig::default().with_path_filter("^maps/"))? {
        println!("  {:>8} {:>8}  {}", entry.offset, entry.size, entry.path);
    }

    // Example 3: extract twice; the second run keeps every existing file
    println!("\nExample 3: Extract");
    let out = work.join("out");
    let config = PakConfig::default().with_on_conflict(ConflictDecision::None);
    for _ in 0..2 {
        let mut prompt = ReaderPrompt::new(std::io::stdin().lock(), std::io::stderr());
        let report = extract(&archive, &out, &config, &mut prompt, &mut NoopProgress)?;
        println!(
            "  extracted {}, skipped {}",
            report.files_extracted, report.files_skipped
        );
    }

    std::fs::remove_dir_all(&work)?;
    println!("\nExamples completed successfully!");
    Ok(())
}
