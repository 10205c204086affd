use rand::Rng;
use rand::seq::SliceRandom;

use super::AccountNumber;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

const LETTER_COUNT: usize = 3;
const DIGIT_COUNT: usize = 10;
const SYMBOL_COUNT: usize = 1;

pub const ACCOUNT_NUMBER_LEN: usize = LETTER_COUNT + DIGIT_COUNT + SYMBOL_COUNT;

/// Generate a fresh account number from the thread-local RNG.
///
/// Uniqueness is probabilistic; the caller checks against existing accounts.
pub fn generate() -> AccountNumber {
    generate_with(&mut rand::thread_rng())
}

/// Generate an account number: 3 letters, 10 digits and 1 symbol, shuffled.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> AccountNumber {
    let mut chars = Vec::with_capacity(ACCOUNT_NUMBER_LEN);
    chars.extend((0..LETTER_COUNT).map(|_| pick(rng, LETTERS)));
    chars.extend((0..DIGIT_COUNT).map(|_| pick(rng, DIGITS)));
    chars.extend((0..SYMBOL_COUNT).map(|_| pick(rng, SYMBOLS)));
    chars.shuffle(rng);
    chars.into_iter().map(char::from).collect()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[u8]) -> u8 {
    pool[rng.gen_range(0..pool.len())]
}
