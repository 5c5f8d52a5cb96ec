use crate::client::{ApiClient, VideoOptions};

/// The lab always shows exactly three ingredient slots.
pub const SLOT_COUNT: usize = 3;

/// One of the three fixed ingredient positions. Created empty, overwritten in
/// place on (re)generation, never destroyed.
#[derive(Debug, Clone, Default)]
pub struct IngredientSlot {
    pub image_url: Option<String>,
    pub prompt: Option<String>,
    pub selected: bool,
    generating: bool,
    pending_prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Empty,
    Generating,
    Populated,
    /// A new generation is in flight while the previous image is still shown.
    Regenerating,
}

impl IngredientSlot {
    #[must_use]
    pub const fn phase(&self) -> SlotPhase {
        match (self.generating, self.image_url.is_some()) {
            (false, false) => SlotPhase::Empty,
            (true, false) => SlotPhase::Generating,
            (false, true) => SlotPhase::Populated,
            (true, true) => SlotPhase::Regenerating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixPhase {
    #[default]
    Idle,
    Enhancing,
    GeneratingVideo,
}

/// State of the mixing chamber: the scene prompt, at most one video at a
/// time, and the error of the last failed mix.
#[derive(Debug, Clone, Default)]
pub struct MixState {
    pub prompt: String,
    pub phase: MixPhase,
    pub video_url: Option<String>,
    pub error: Option<String>,
}

/// An entry of the derived selection set: a slot holding an image with its
/// selected flag on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedIngredient {
    pub slot: usize,
    pub image_url: String,
    pub prompt: String,
}

/// In-memory state for the three-step flow: generate ingredients, select a
/// subset, mix them into a video.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    slots: [IngredientSlot; SLOT_COUNT],
    pub mix: MixState,
}

impl Wizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if `slot >= SLOT_COUNT`.
    #[must_use]
    pub const fn slot(&self, slot: usize) -> &IngredientSlot {
        &self.slots[slot]
    }

    /// Mark a slot's generation as started. Returns false (and does nothing)
    /// when a generation for that slot is already in flight.
    pub fn begin_generation(&mut self, slot: usize, prompt: &str) -> bool {
        let s = &mut self.slots[slot];
        if s.generating {
            return false;
        }
        s.generating = true;
        s.pending_prompt = Some(prompt.to_string());
        true
    }

    /// Apply the outcome of a slot's generation call. On success the slot is
    /// populated and auto-selected; on failure it is left as it was.
    pub fn finish_generation(&mut self, slot: usize, outcome: anyhow::Result<String>) {
        let s = &mut self.slots[slot];
        s.generating = false;
        let pending = s.pending_prompt.take();
        match outcome {
            Ok(image_url) => {
                s.image_url = Some(image_url);
                s.prompt = pending;
                s.selected = true;
            }
            Err(e) => {
                tracing::warn!(slot, error = %e, "ingredient generation failed");
            }
        }
    }

    /// Flip a slot's selected flag. A slot without an image cannot be
    /// selected, so toggling it is a no-op.
    pub fn toggle_select(&mut self, slot: usize) {
        let s = &mut self.slots[slot];
        if s.image_url.is_some() {
            s.selected = !s.selected;
        }
    }

    /// The ordered subsequence of slots holding both an image and the
    /// selected flag. Recomputed on every call; 0..=3 entries by
    /// construction.
    #[must_use]
    pub fn selection(&self) -> Vec<SelectedIngredient> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.selected)
            .filter_map(|(i, s)| {
                s.image_url.as_ref().map(|url| SelectedIngredient {
                    slot: i,
                    image_url: url.clone(),
                    prompt: s.prompt.clone().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// The text sent for enhancement: the mix prompt, augmented with the
    /// selected ingredients' originating prompts so the rewrite knows the
    /// scene elements without being biased towards any single image.
    #[must_use]
    pub fn enhance_input(&self) -> String {
        let selection = self.selection();
        if selection.is_empty() {
            return self.mix.prompt.clone();
        }
        let descriptions: Vec<&str> = selection.iter().map(|s| s.prompt.as_str()).collect();
        format!(
            "{}. Scene elements: {}",
            self.mix.prompt,
            descriptions.join(", ")
        )
    }

    /// Generate one slot's ingredient and apply the result.
    /// A no-op when the slot already has a generation in flight.
    pub async fn generate_slot(&mut self, client: &ApiClient, slot: usize, prompt: &str) {
        if !self.begin_generation(slot, prompt) {
            return;
        }
        let outcome = client.generate_image(prompt).await;
        self.finish_generation(slot, outcome);
    }

    /// The bulk "generate all" action: issue all three image-generation
    /// calls concurrently and join once all settle. Partial success is
    /// tolerated: failed slots stay unchanged, successful ones populate.
    /// Slots with a generation already in flight are skipped.
    pub async fn generate_all(&mut self, client: &ApiClient, prompts: [&str; SLOT_COUNT]) {
        let accepted = [
            self.begin_generation(0, prompts[0]),
            self.begin_generation(1, prompts[1]),
            self.begin_generation(2, prompts[2]),
        ];

        async fn run(
            client: &ApiClient,
            go: bool,
            prompt: &str,
        ) -> Option<anyhow::Result<String>> {
            if go {
                Some(client.generate_image(prompt).await)
            } else {
                None
            }
        }

        let (r0, r1, r2) = tokio::join!(
            run(client, accepted[0], prompts[0]),
            run(client, accepted[1], prompts[1]),
            run(client, accepted[2], prompts[2]),
        );

        for (slot, outcome) in [r0, r1, r2].into_iter().enumerate() {
            if let Some(outcome) = outcome {
                self.finish_generation(slot, outcome);
            }
        }
    }

    /// Rewrite the mix prompt via the enhancement endpoint
    /// (`Idle -> Enhancing -> Idle`). On failure the prompt is kept and the
    /// error recorded.
    pub async fn enhance(&mut self, client: &ApiClient) {
        if self.mix.prompt.trim().is_empty() || self.mix.phase != MixPhase::Idle {
            return;
        }
        self.mix.phase = MixPhase::Enhancing;
        self.mix.error = None;

        let input = self.enhance_input();
        match client.enhance_prompt(&input).await {
            Ok(enhanced) => self.mix.prompt = enhanced,
            Err(e) => self.mix.error = Some(e.to_string()),
        }
        self.mix.phase = MixPhase::Idle;
    }

    /// Mix the current selection into a video
    /// (`Idle -> GeneratingVideo -> result | error`). Starting a new mix
    /// clears the previous result.
    pub async fn generate_video(&mut self, client: &ApiClient) {
        let selection = self.selection();
        if self.mix.prompt.trim().is_empty()
            || selection.is_empty()
            || self.mix.phase != MixPhase::Idle
        {
            return;
        }
        self.mix.phase = MixPhase::GeneratingVideo;
        self.mix.error = None;
        self.mix.video_url = None;

        let image_urls: Vec<String> = selection.into_iter().map(|s| s.image_url).collect();
        match client
            .generate_video(&image_urls, &self.mix.prompt, &VideoOptions::default())
            .await
        {
            Ok(video_url) => self.mix.video_url = Some(video_url),
            Err(e) => self.mix.error = Some(e.to_string()),
        }
        self.mix.phase = MixPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated(wizard: &mut Wizard, slot: usize, url: &str, prompt: &str) {
        assert!(wizard.begin_generation(slot, prompt));
        wizard.finish_generation(slot, Ok(url.to_string()));
    }

    #[test]
    fn toggle_flips_only_that_slot() {
        let mut w = Wizard::new();
        populated(&mut w, 0, "http://x/0.png", "a fox");
        populated(&mut w, 1, "http://x/1.png", "a crow");

        // generation auto-selects; deselect slot 1
        w.toggle_select(1);
        assert!(w.slot(0).selected);
        assert!(!w.slot(1).selected);

        w.toggle_select(1);
        assert!(w.slot(0).selected);
        assert!(w.slot(1).selected);
    }

    #[test]
    fn empty_slot_cannot_be_selected() {
        let mut w = Wizard::new();
        w.toggle_select(2);
        assert!(!w.slot(2).selected);
        assert!(w.selection().is_empty());
    }

    #[test]
    fn selection_excludes_slots_without_an_image() {
        let mut w = Wizard::new();
        populated(&mut w, 1, "http://x/1.png", "a crow");
        // slot 0 stays empty, slot 2 populated but deselected
        populated(&mut w, 2, "http://x/2.png", "a moon");
        w.toggle_select(2);

        let sel = w.selection();
        assert_eq!(sel.len(), 1);
        assert_eq!(sel[0].slot, 1);
        assert_eq!(sel[0].image_url, "http://x/1.png");
        assert_eq!(sel[0].prompt, "a crow");
    }

    #[test]
    fn selection_preserves_slot_order() {
        let mut w = Wizard::new();
        populated(&mut w, 2, "http://x/2.png", "c");
        populated(&mut w, 0, "http://x/0.png", "a");

        let slots: Vec<usize> = w.selection().iter().map(|s| s.slot).collect();
        assert_eq!(slots, vec![0, 2]);
    }

    #[test]
    fn failed_generation_leaves_slot_unchanged() {
        let mut w = Wizard::new();
        populated(&mut w, 0, "http://x/old.png", "old prompt");

        assert!(w.begin_generation(0, "new prompt"));
        assert_eq!(w.slot(0).phase(), SlotPhase::Regenerating);
        w.finish_generation(0, Err(anyhow::anyhow!("boom")));

        assert_eq!(w.slot(0).phase(), SlotPhase::Populated);
        assert_eq!(w.slot(0).image_url.as_deref(), Some("http://x/old.png"));
        assert_eq!(w.slot(0).prompt.as_deref(), Some("old prompt"));
    }

    #[test]
    fn no_second_generation_while_one_is_in_flight() {
        let mut w = Wizard::new();
        assert!(w.begin_generation(0, "first"));
        assert!(!w.begin_generation(0, "second"));
        assert_eq!(w.slot(0).phase(), SlotPhase::Generating);

        w.finish_generation(0, Ok("http://x/first.png".to_string()));
        assert_eq!(w.slot(0).prompt.as_deref(), Some("first"));
    }

    #[test]
    fn enhance_input_appends_scene_elements() {
        let mut w = Wizard::new();
        w.mix.prompt = "they dance together".to_string();
        assert_eq!(w.enhance_input(), "they dance together");

        populated(&mut w, 0, "http://x/0.png", "a red fox");
        populated(&mut w, 1, "http://x/1.png", "a tin robot");
        assert_eq!(
            w.enhance_input(),
            "they dance together. Scene elements: a red fox, a tin robot"
        );
    }

    /// Stand-in for the mixlab API: answers generate-image requests with a
    /// URL derived from the prompt, or a 500 for prompts containing "bad".
    async fn mock_api() -> (String, tokio::task::JoinHandle<()>) {
        use axum::{Json, Router, http::StatusCode, routing::post};
        use serde_json::{Value, json};

        let app = Router::new().route(
            "/api/generate-image",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["prompt"].as_str().unwrap_or_default();
                if prompt.contains("bad") {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "Failed to generate image", "details": "boom"})),
                    )
                } else {
                    (
                        StatusCode::OK,
                        Json(json!({"imageUrl": format!("http://img/{prompt}.png"), "success": true})),
                    )
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn generate_all_tolerates_partial_failure() {
        let (base, server) = mock_api().await;
        let client = ApiClient::new(base);

        let mut w = Wizard::new();
        w.generate_all(&client, ["a fox", "bad apple", "a moon"]).await;

        assert_eq!(w.slot(0).image_url.as_deref(), Some("http://img/a fox.png"));
        assert!(w.slot(0).selected);
        assert_eq!(w.slot(1).phase(), SlotPhase::Empty);
        assert!(!w.slot(1).selected);
        assert_eq!(w.slot(2).image_url.as_deref(), Some("http://img/a moon.png"));
        assert!(w.slot(2).selected);

        server.abort();
    }
}
