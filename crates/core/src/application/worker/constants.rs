// Worker constants (no magic values)
use std::time::Duration;

/// Simulated work duration for every stage (3s)
pub const DELAY_TIME_MILLIS: u64 = 3000;

/// Private output directory name, relative to the app files dir
pub const OUTPUT_PATH: &str = "blur_filter_outputs";

/// Prefix of the temporary blur output files
pub const OUTPUT_FILE_PREFIX: &str = "blur-filter-output-";

/// Unique work name of the blur chain
pub const IMAGE_MANIPULATION_WORK_NAME: &str = "image_manipulation_work";

/// Tag on the stage whose output the UI shows
pub const TAG_OUTPUT: &str = "OUTPUT";

/// First API level that saves through the indexed media store
pub const ANDROID_Q_API_LEVEL: u32 = 29;

/// Title and MIME type of the saved image
pub const SAVED_IMAGE_TITLE: &str = "Blurred Image";
pub const PNG_MIME_TYPE: &str = "image/png";
pub const PICTURES_RELATIVE_PATH: &str = "Pictures";

/// How often an unmet constraint is re-checked
pub const CONSTRAINT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Free storage below this counts as "storage low"
pub const DEFAULT_MIN_FREE_STORAGE_MB: u64 = 64;

// Stage names
pub const BLUR_STAGE: &str = "blur";
pub const SAVE_STAGE: &str = "save";
pub const CLEANUP_STAGE: &str = "cleanup";

// Notification channel
pub const VERBOSE_NOTIFICATION_CHANNEL_NAME: &str = "Verbose WorkManager Notifications";
pub const VERBOSE_NOTIFICATION_CHANNEL_DESCRIPTION: &str =
    "Shows notifications whenever work starts";
pub const CHANNEL_ID: &str = "VERBOSE_NOTIFICATION";
pub const NOTIFICATION_TITLE: &str = "WorkRequest Starting";
pub const NOTIFICATION_ID: u32 = 1;

// User-facing messages
pub const BLURRING_IMAGE: &str = "Blurring image";
pub const SAVING_IMAGE: &str = "Saving image";
pub const CLEANING_UP_FILES: &str = "Cleaning up";
pub const INVALID_INPUT_URI: &str = "Invalid input uri";
pub const ERROR_APPLYING_BLUR: &str = "Error applying blur";
pub const ERROR_SAVING_IMAGE: &str = "Error saving image";
pub const WRITING_TO_MEDIA_STORE_FAILED: &str = "Writing to MediaStore failed";
