use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Speaker → color mapping (extensible)
    pub speaker_colors: HashMap<String, [u8; 4]>,

    /// Last scenario CSV the experimenter picked; prefills the setup
    /// page on the next launch.
    #[serde(default)]
    pub last_scenario_path: Option<PathBuf>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut speaker_colors = HashMap::new();

        speaker_colors.insert("Participant".into(), [40, 70, 120, 255]);
        speaker_colors.insert("Ai".into(), [40, 90, 60, 255]);
        speaker_colors.insert("System".into(), [80, 80, 80, 255]);

        Self {
            ui_scale: 1.0,
            speaker_colors,
            last_scenario_path: None,
        }
    }
}

impl UiSettings {
    pub fn color(&self, key: &str) -> Color32 {
        self.speaker_colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::WHITE)
    }
}
