use std::env;
use std::path::PathBuf;
use std::process;

use vmufs::{list_occupied, load, read_root};

fn main() -> Result<(), vmufs::Error> {
    let path = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example inspect -- <path-to-image>");
        process::exit(1);
    });

    let root = read_root(&path)?;
    eprintln!("{:#?}", root);

    let snapshot = load(&path)?;
    for (slot, name) in list_occupied(&snapshot) {
        let entry = &snapshot.entries()[slot];
        let chain = snapshot.chain(slot).map(|chain| chain.blocks()).unwrap_or(&[]);
        eprintln!("{slot:3} {name:12} {:3} blocks {:?}", entry.size_blocks, chain);
    }
    eprintln!("{} blocks free", snapshot.free_blocks());

    Ok(())
}
