// The library does the work; this binary only points at the demo.
//   RUST_LOG=debug cargo run --example xor
fn main() {
    println!("ferrite-learn: feed-forward networks with per-layer optimizers.");
    println!("Run `cargo run --example xor` for a training demo.");
}
