mod replacement_test;
