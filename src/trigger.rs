use std::sync::Arc;

use crate::audio::{Instrument, NotePlayer};
use crate::detector::{
    HandResults, Landmark, INDEX_PIP, INDEX_TIP, LANDMARKS_PER_HAND, MIDDLE_TIP, PINKY_TIP,
    RING_TIP, THUMB_MCP, THUMB_TIP,
};
use crate::state::TriggerSettings;

/// Piano note names, one per finger: thumb, index, middle, ring, pinky.
const PIANO_NOTES: [&str; 5] = ["piano_a", "piano_b", "piano_c", "piano_d", "piano_e"];
const FINGER_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Decides, per frame, whether landmark geometry should play a note.
///
/// The predicate itself is stateless per call; the only state is the
/// per-finger "down" flag so a held gesture fires once and releasing
/// re-arms it.
pub struct GestureTrigger {
    player: Arc<NotePlayer>,
    instrument: Instrument,
    settings: TriggerSettings,
    piano_down: [bool; 5],
    synth_down: bool,
}

impl GestureTrigger {
    pub fn new(player: Arc<NotePlayer>, instrument: Instrument, settings: TriggerSettings) -> Self {
        Self {
            player,
            instrument,
            settings,
            piano_down: [false; 5],
            synth_down: false,
        }
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Switches the active instrument and resets all re-arm state.
    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.instrument = instrument;
        self.piano_down = [false; 5];
        self.synth_down = false;
    }

    /// Per-frame entry point. Triggers are dropped until the note sound has
    /// finished decoding, so an early gesture can never race the load.
    pub fn on_results(&mut self, results: &HandResults) {
        if !self.player.is_loaded() {
            return;
        }

        for hand in &results.hands {
            if hand.len() < LANDMARKS_PER_HAND {
                tracing::warn!("Ignoring hand with {} landmarks", hand.len());
                continue;
            }
            match self.instrument {
                Instrument::Piano => self.eval_piano(hand),
                Instrument::Synthesizer => self.eval_synthesizer(hand),
            }
        }
    }

    /// Piano: each fingertip crossing its threshold plays its own note.
    /// The thumb uses an inward-curl test on x; the other fingers a
    /// vertical threshold on y.
    fn eval_piano(&mut self, hand: &[Landmark]) {
        for (finger, &tip) in FINGER_TIPS.iter().enumerate() {
            let pressing = if finger == 0 {
                hand[THUMB_TIP].x < hand[THUMB_MCP].x - self.settings.thumb_curl_x
            } else {
                hand[tip].y > self.settings.finger_y[finger - 1]
            };

            if pressing && !self.piano_down[finger] {
                self.piano_down[finger] = true;
                self.play(Instrument::Piano, PIANO_NOTES[finger]);
            } else if !pressing {
                self.piano_down[finger] = false;
            }
        }
    }

    /// Synthesizer: an index-finger curl (tip above the PIP joint) plays
    /// the single note.
    fn eval_synthesizer(&mut self, hand: &[Landmark]) {
        let curled = hand[INDEX_TIP].y < hand[INDEX_PIP].y - self.settings.index_curl_margin;

        if curled && !self.synth_down {
            self.synth_down = true;
            if let Err(e) = self.player.play_note() {
                tracing::warn!("Failed to play note: {}", e);
            }
        } else if !curled {
            self.synth_down = false;
        }
    }

    fn play(&self, instrument: Instrument, name: &str) {
        if let Err(e) = self.player.play_sound(instrument, name) {
            tracing::warn!("Failed to play sound '{}': {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::playback::tests::{counting_player, write_test_wav};
    use std::sync::atomic::Ordering;

    fn flat_hand() -> Vec<Landmark> {
        // All landmarks well above every threshold, thumb uncurled
        let mut hand = vec![Landmark::new(0.5, 0.3, 0.0); LANDMARKS_PER_HAND];
        hand[THUMB_MCP].x = 0.4;
        hand[THUMB_TIP].x = 0.45;
        hand
    }

    fn results_with(hand: Vec<Landmark>) -> HandResults {
        HandResults { hands: vec![hand] }
    }

    async fn loaded_player() -> (Arc<NotePlayer>, Arc<std::sync::atomic::AtomicUsize>) {
        let dir = tempfile::tempdir().unwrap();
        let (player, starts) = counting_player();

        let note = dir.path().join("audio/note.wav");
        write_test_wav(&note);
        player.load_note_sound(&note).await.unwrap();

        for (_, rel) in Instrument::Piano.sound_files() {
            write_test_wav(&dir.path().join(rel));
        }
        player
            .load_instrument_sounds(dir.path(), Instrument::Piano)
            .await;

        (player, starts)
    }

    #[tokio::test]
    async fn held_curl_fires_once_and_rearms_on_release() {
        let (player, starts) = loaded_player().await;
        let mut trigger =
            GestureTrigger::new(player, Instrument::Synthesizer, TriggerSettings::default());

        let mut curled = flat_hand();
        curled[INDEX_TIP].y = 0.3;
        curled[INDEX_PIP].y = 0.5;

        trigger.on_results(&results_with(curled.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        // Holding the gesture must not retrigger
        trigger.on_results(&results_with(curled.clone()));
        trigger.on_results(&results_with(curled.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        // Release, then curl again
        trigger.on_results(&results_with(flat_hand()));
        trigger.on_results(&results_with(curled));
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn triggers_dropped_until_sound_is_loaded() {
        let (player, starts) = counting_player();
        let mut trigger = GestureTrigger::new(
            Arc::clone(&player),
            Instrument::Synthesizer,
            TriggerSettings::default(),
        );

        let mut curled = flat_hand();
        curled[INDEX_TIP].y = 0.3;
        curled[INDEX_PIP].y = 0.5;

        trigger.on_results(&results_with(curled.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        let dir = tempfile::tempdir().unwrap();
        let note = dir.path().join("note.wav");
        write_test_wav(&note);
        player.load_note_sound(&note).await.unwrap();

        // The still-held gesture fires once decode has completed
        trigger.on_results(&results_with(curled));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn piano_fingers_trigger_independently() {
        let (player, starts) = loaded_player().await;
        let mut trigger =
            GestureTrigger::new(player, Instrument::Piano, TriggerSettings::default());

        let mut hand = flat_hand();
        hand[INDEX_TIP].y = 0.7; // past the 0.6 threshold
        trigger.on_results(&results_with(hand.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        // A second finger on the same frame sequence adds one more note
        hand[PINKY_TIP].y = 0.7;
        trigger.on_results(&results_with(hand.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 2);

        // Both held: nothing new
        trigger.on_results(&results_with(hand));
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn thumb_uses_inward_curl_not_y_threshold() {
        let (player, starts) = loaded_player().await;
        let mut trigger =
            GestureTrigger::new(player, Instrument::Piano, TriggerSettings::default());

        let mut hand = flat_hand();
        hand[THUMB_TIP].y = 0.9; // vertical position is irrelevant for the thumb
        trigger.on_results(&results_with(hand.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        hand[THUMB_MCP].x = 0.5;
        hand[THUMB_TIP].x = 0.4; // curled inward past the tolerance
        trigger.on_results(&results_with(hand));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_results_and_short_hands_are_ignored() {
        let (player, starts) = loaded_player().await;
        let mut trigger =
            GestureTrigger::new(player, Instrument::Piano, TriggerSettings::default());

        trigger.on_results(&HandResults::empty());
        trigger.on_results(&results_with(vec![Landmark::new(0.5, 0.9, 0.0); 5]));
        assert_eq!(starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn switching_instrument_resets_rearm_state() {
        let (player, starts) = loaded_player().await;
        let mut trigger =
            GestureTrigger::new(player, Instrument::Piano, TriggerSettings::default());

        let mut hand = flat_hand();
        hand[INDEX_TIP].y = 0.7;
        trigger.on_results(&results_with(hand.clone()));
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        trigger.set_instrument(Instrument::Piano);
        trigger.on_results(&results_with(hand));
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }
}
