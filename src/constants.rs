pub const APP_NAME: &str = "cherry";

pub const HABITS: [&str; 12] = [
    "Early morning",
    "Morning snack",
    "Breakfast",
    "Mid-lunch",
    "Lunch",
    "Evening snack",
    "Dinner",
    "Sleep time",
    "Dance",
    "Piano",
    "Resin",
    "Study",
];

pub const DEFAULT_CHECKLIST: [&str; 5] = ["Wake up", "Pray/Meditate", "Workout", "Practice", "Rest"];

pub const KEY_PREFIXES: KeyPrefixes = KeyPrefixes {
    time: "tracker_time_",
    check: "tracker_check_",
    hobby: "tracker_hobby_",
};

pub const CHECKLIST_ITEMS_KEY: &str = "tracker_check_items";

pub const GRID_SETTINGS: GridSettings = GridSettings {
    default_max_minutes: 60,
    name_width: 14,
    empty_cell: '·',
    levels: &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'],
};

pub const FILE_SETTINGS: FileSettings = FileSettings {
    record_extension: "json",
    config_file: "config.json",
};

pub struct KeyPrefixes {
    pub time: &'static str,
    pub check: &'static str,
    pub hobby: &'static str,
}

pub struct GridSettings {
    pub default_max_minutes: u32,
    pub name_width: usize,
    pub empty_cell: char,
    pub levels: &'static [char],
}

pub struct FileSettings {
    pub record_extension: &'static str,
    pub config_file: &'static str,
}
