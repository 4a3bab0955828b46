use log::info;
use rs_chain_core::{ChainError, MarkovChain};

/// Marks the beginning of a word
const START_CHAR: char = '<';
/// Marks the end of a word
const END_CHAR: char = '>';
/// Stop generating after this many characters
const MAX_LEN: usize = 16;

/// Generates one word by walking the chain from `START_CHAR` until `END_CHAR`.
fn generate(chain: &mut MarkovChain<char>) -> Result<String, ChainError> {
    let mut history = vec![START_CHAR];
    let mut word = String::new();

    while word.chars().count() < MAX_LEN {
        let next = chain.weighted_random_next(&history)?;
        if next == END_CHAR {
            break;
        }
        word.push(next);
        history.push(next);
    }
    Ok(word)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows what the chain learns
    env_logger::init();

    let names = ["aurelia", "aurore", "amelie", "bernard", "beatrice", "camille", "celine", "clement", "delphine", "mathilde"];

    // Each name is wrapped with start/end markers so that generation knows
    // where a word begins and where it may stop
    let mut chain: MarkovChain<char> = MarkovChain::seeded(2024).with_max_order(3)?;
    let trained = chain.train(names.iter().map(|name| {
        std::iter::once(START_CHAR)
            .chain(name.chars())
            .chain(std::iter::once(END_CHAR))
            .collect::<Vec<_>>()
    }));
    info!("trained on {} names, alphabet of {} states", trained, chain.all_known_states().len());

    for i in 0..5 {
        println!("Generated name {}: {}", i + 1, generate(&mut chain)?);
    }

    // Priors let the chain leave the training data, but also make it
    // produce '>' or '<' at odd places; remove them to go back
    chain.add_priors(0.01)?;
    for i in 0..5 {
        println!("Generated name with priors {}: {}", i + 1, generate(&mut chain)?);
    }
    chain.remove_default_weak_links();

    // Words work the same way
    let mut words: MarkovChain<&str> = MarkovChain::new();
    words.add_sequence(&["one", "small", "step", "for", "man"])?;
    words.add_sequence(&["one", "giant", "leap", "for", "mankind"])?;

    println!("After 'one': {:?}", words.all_possible_next(&["one"])?);
    println!("After 'mankind': {:?}", words.all_possible_next(&["mankind"])?);

    // Asking for an unknown state is an error
    match words.all_possible_next(&["moon"]) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("'moon' is rejected: {}", e),
    }

    // A terminal state has nothing to sample
    match words.weighted_random_next(&["mankind"]) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("'mankind' is terminal: {}", e),
    }

    Ok(())
}
