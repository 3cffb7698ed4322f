mod facade_test;
mod peak_detection_test;
