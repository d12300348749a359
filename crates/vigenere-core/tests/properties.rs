//! Property checks for the statistics and cipher primitives.

use proptest::prelude::*;
use vigenere_core::{
    calculate_index_of_coincidence, decrypt_text, encrypt, find_repeating_patterns,
    get_substrings, interleave, Key, Language,
};

fn upper_text(max: usize) -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("[A-Z]{{1,{max}}}")).unwrap()
}

fn small_alphabet_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ABC]{1,60}").unwrap()
}

/// Text of at least two letters paired with an arbitrary permutation of it.
fn text_and_permutation() -> impl Strategy<Value = (String, Vec<char>)> {
    proptest::string::string_regex("[A-Z]{2,80}")
        .unwrap()
        .prop_flat_map(|text| {
            let chars: Vec<char> = text.chars().collect();
            (Just(text), Just(chars).prop_shuffle())
        })
}

proptest! {
    #[test]
    fn patterns_are_exhaustive(text in small_alphabet_text(), length in 1usize..5) {
        let patterns = find_repeating_patterns(&text, length).unwrap();

        for (pattern, offsets) in &patterns {
            prop_assert!(offsets.len() >= 2);
            prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
            for &o in offsets {
                prop_assert_eq!(&text[o..o + length], pattern.as_str());
            }
            let expected = (0..=text.len() - length)
                .filter(|&i| &text[i..i + length] == pattern.as_str())
                .count();
            prop_assert_eq!(offsets.len(), expected);
        }

        if text.len() >= length {
            for i in 0..=text.len() - length {
                let window = &text[i..i + length];
                let occurrences = (0..=text.len() - length)
                    .filter(|&j| &text[j..j + length] == window)
                    .count();
                prop_assert_eq!(occurrences >= 2, patterns.contains_key(window));
            }
        }
    }

    #[test]
    fn columns_are_lossless(text in upper_text(80), key_length in 1usize..12) {
        let columns = get_substrings(&text, key_length).unwrap();
        prop_assert_eq!(columns.len(), key_length);

        let floor = text.len() / key_length;
        let ceil = text.len().div_ceil(key_length);
        for column in &columns {
            prop_assert!(column.len() == floor || column.len() == ceil);
        }
        prop_assert_eq!(columns.iter().map(String::len).sum::<usize>(), text.len());

        prop_assert_eq!(interleave(&columns), text);
    }

    #[test]
    fn coincidence_is_bounded_and_order_free((text, shuffled) in text_and_permutation()) {
        let ic = calculate_index_of_coincidence(&text).unwrap();
        prop_assert!((0.0..=1.0).contains(&ic));

        let permuted: String = shuffled.into_iter().collect();
        prop_assert!((calculate_index_of_coincidence(&permuted).unwrap() - ic).abs() < 1e-12);
    }

    #[test]
    fn decrypt_inverts_encrypt(text in upper_text(120), key in upper_text(12)) {
        let key = Key::new(&key, Language::English).unwrap();
        let cipher = encrypt(&text, &key, Language::English).unwrap();
        prop_assert_eq!(cipher.len(), text.len());
        prop_assert_eq!(decrypt_text(&cipher, &key, Language::English).unwrap(), text);
    }
}
