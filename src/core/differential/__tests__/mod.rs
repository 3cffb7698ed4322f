mod smoothness_test;
