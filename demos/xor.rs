use ferrite_learn::{Adam, Dataset, Layer, LossType, Network};

fn main() -> ferrite_learn::Result<()> {
    env_logger::init();

    let mut network = Network::new(2, LossType::Mse);
    network.add_layer(Layer::relu(8, Adam::new(0.01, 0.9, 0.999, 1e-8, 0.0)))?;
    network.add_layer(Layer::sigmoid(1, Adam::new(0.01, 0.9, 0.999, 1e-8, 0.0)))?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];
    let mut data = Dataset::from_rows(&inputs, &expected_outputs)?;

    println!("Loss before training: {:.6}", network.average_loss(&data)?);

    for round in 1..=10 {
        let losses = network.train(&mut data, 4, 200, true)?;
        if let Some(last) = losses.last() {
            println!("Epoch {}: loss = {:.6}", round * 200, last);
        }
    }

    println!("Loss after training: {:.6}", network.average_loss(&data)?);

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.forward(input)?[0]);
    }

    Ok(())
}
