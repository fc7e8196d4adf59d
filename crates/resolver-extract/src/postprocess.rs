//! Finishing touches applied to a resolved call list right before it's
//! returned. Currently a single, narrow heuristic: `play_music` calls whose
//! `song` argument is just a genre name plus the word "music" get the
//! redundant suffix stripped, since extraction otherwise hands the whole
//! phrase ("jazz music") to a parameter that's meant to hold a song or
//! genre, not a description of one.

use resolver_types::{ArgValue, Call};

const STRONG_GENRES: &[&str] = &[
    "jazz", "rock", "pop", "metal", "country", "rap", "blues", "soul", "funk", "disco", "techno",
    "house", "lo-fi", "hip hop", "hip-hop",
];

pub fn post_process_args(calls: Vec<Call>) -> Vec<Call> {
    calls.into_iter().map(strip_redundant_music_suffix).collect()
}

fn strip_redundant_music_suffix(mut call: Call) -> Call {
    if call.name != "play_music" {
        return call;
    }
    if let Some(ArgValue::Str(song)) = call.arguments.get("song") {
        let lower = song.to_lowercase();
        if let Some(prefix) = lower.strip_suffix(" music") {
            if STRONG_GENRES.contains(&prefix) {
                let stripped_len = song.len() - " music".len();
                let new_song = song[..stripped_len].to_string();
                call.arguments.insert("song".to_string(), ArgValue::Str(new_song));
            }
        }
    }
    call
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_music(song: &str) -> Call {
        let mut call = Call::new("play_music");
        call.arguments.insert("song".into(), ArgValue::Str(song.into()));
        call
    }

    #[test]
    fn strips_music_suffix_for_known_genre() {
        let out = post_process_args(vec![play_music("jazz music")]);
        assert_eq!(out[0].arguments.get("song"), Some(&ArgValue::Str("jazz".into())));
    }

    #[test]
    fn leaves_non_genre_song_names_untouched() {
        let out = post_process_args(vec![play_music("Bohemian Rhapsody")]);
        assert_eq!(
            out[0].arguments.get("song"),
            Some(&ArgValue::Str("Bohemian Rhapsody".into()))
        );
    }

    #[test]
    fn ignores_other_tools() {
        let mut call = Call::new("set_timer");
        call.arguments.insert("minutes".into(), ArgValue::I64(5));
        let out = post_process_args(vec![call.clone()]);
        assert_eq!(out[0], call);
    }
}
