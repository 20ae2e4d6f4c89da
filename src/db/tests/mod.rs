
use crate::types::AlbumRecord;
use chrono::NaiveDate;

/// Sample record with three images
pub(super) fn sample_record() -> AlbumRecord {
    AlbumRecord {
        title: "Street snaps".to_string(),
        source_url: "http://toutiao.com/group/6570000000000000001/".to_string(),
        publish_date: NaiveDate::from_ymd_opt(2018, 6, 24).unwrap(),
        author: "Photo Desk".to_string(),
        images: vec![
            "http://p1.pstatp.com/origin/a".to_string(),
            "http://p1.pstatp.com/origin/b".to_string(),
            "http://p1.pstatp.com/origin/c".to_string(),
        ],
    }
}
