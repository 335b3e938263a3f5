use crate::wall::WallSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview<'a> {
    pub url: &'a str,
    pub file_name: &'a str,
    pub alt: String,
}

/// Side panel contents. The clear control is shown exactly when `preview` is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPanelView<'a> {
    pub picker_enabled: bool,
    pub hint: String,
    pub preview: Option<Preview<'a>>,
}

impl UploadPanelView<'_> {
    pub fn show_clear(&self) -> bool {
        self.preview.is_some()
    }
}

pub fn compose<'a>(wall: &WallSnapshot<'a>) -> UploadPanelView<'a> {
    let Some(country) = wall.selection else {
        return UploadPanelView {
            picker_enabled: false,
            hint: "Pick a country on the map to start.".to_string(),
            preview: None,
        };
    };
    UploadPanelView {
        picker_enabled: true,
        hint: format!(
            "Add a travel photo for {}. (Stored in-memory only.)",
            country.name
        ),
        preview: wall.current_photo().map(|p| Preview {
            url: p.url(),
            file_name: &p.file_name,
            alt: format!("Travel photo for {}", country.name),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Country;
    use crate::photos::{MemoryFile, MemoryStore};
    use crate::wall::WallController;

    #[test]
    fn disabled_without_selection() {
        let wall = WallController::new(MemoryStore::new(), 3);
        let view = compose(&wall.snapshot());
        assert!(!view.picker_enabled);
        assert_eq!(view.hint, "Pick a country on the map to start.");
        assert!(!view.show_clear());
    }

    #[test]
    fn enabled_without_preview_until_a_photo_exists() {
        let mut wall = WallController::new(MemoryStore::new(), 3);
        wall.select_country(Country::new("008", "Albania"));
        let view = compose(&wall.snapshot());
        assert!(view.picker_enabled);
        assert_eq!(view.hint, "Add a travel photo for Albania. (Stored in-memory only.)");
        assert!(view.preview.is_none());
    }

    #[test]
    fn preview_tracks_the_selected_country() {
        let mut wall = WallController::new(MemoryStore::new(), 3);
        wall.select_country(Country::new("008", "Albania"));
        wall.attach_to_selection(Some(&MemoryFile::new("a.jpg", vec![7])));
        let snap = wall.snapshot();
        let view = compose(&snap);
        assert_eq!(
            view.preview,
            Some(Preview {
                url: "mem:1",
                file_name: "a.jpg",
                alt: "Travel photo for Albania".to_string(),
            })
        );
        assert!(view.show_clear());

        wall.select_country(Country::new("012", "Algeria"));
        assert!(compose(&wall.snapshot()).preview.is_none());
    }
}
