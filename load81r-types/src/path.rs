//! Remote path helpers.
//!
//! Remote paths are plain `/`-separated strings on the device's FAT32
//! volume; they never go through `std::path`, which would apply local
//! platform rules.

/// The device's root directory.
pub const ROOT: &str = "/";

/// Join a child name onto a remote directory path.
///
/// Under the root this yields `/name`, never `//name`. A trailing slash on
/// `parent` is ignored.
pub fn join_remote(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{name}")
    } else {
        format!("{}/{name}", parent.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_of_root_has_single_slash() {
        assert_eq!(join_remote("/", "name"), "/name");
    }

    #[test]
    fn child_of_subdirectory() {
        assert_eq!(join_remote("/load81", "nex.lua"), "/load81/nex.lua");
        assert_eq!(join_remote("/d/sub", "y.txt"), "/d/sub/y.txt");
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        assert_eq!(join_remote("/load81/", "a.lua"), "/load81/a.lua");
    }

    #[test]
    fn relative_parent_is_kept_relative() {
        assert_eq!(join_remote("games", "snake.lua"), "games/snake.lua");
    }
}
