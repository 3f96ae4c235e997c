use clap::Parser;
use pramef::EncodedTerm;

#[derive(Debug, Parser)]
pub struct Encode {
    /// Raw sequence terms
    #[arg(required = true)]
    terms: Vec<u64>,
}

impl Encode {
    pub fn run(self) {
        let encoded: Vec<String> = self
            .terms
            .into_iter()
            .map(|term| EncodedTerm::encode(term).to_string())
            .collect();
        println!("{}", encoded.join(" "));
    }
}
