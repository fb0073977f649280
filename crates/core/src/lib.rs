//! Tooth numbering and anomaly charting for panoramic dental radiographs.

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod error;
    pub mod radiograph;
    pub mod settings;
}

pub mod catalog {
    pub mod anomaly_catalog;
}

pub mod detection {
    pub mod domain {
        pub mod detections;
        pub mod object_detector;
    }
    pub mod infrastructure;
}

pub mod charting {
    pub mod annotation_instruction;
    pub mod anomaly_assigner;
    pub mod chart_engine;
    pub mod report;
    pub mod tooth_layout_resolver;
}

pub mod annotation {
    pub mod domain {
        pub mod annotation_renderer;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod image_reader;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod analyze_radiograph_use_case;
    pub mod pipeline_logger;
    pub mod session_reports;
}
